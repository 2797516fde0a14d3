use std::collections::HashMap;

use crate::symbol_table::ClassSymbol;
use crate::type_decl::TypeDecl;

/// Generic parameter name to the concrete type bound at a use site.
pub type GenericBindings = HashMap<String, TypeDecl>;

/// Pairs a class's generic parameters with the receiver's type arguments.
/// Missing arguments (raw or diamond-less types) leave the parameter unbound.
pub fn bindings_for(class: &ClassSymbol, receiver: &TypeDecl) -> GenericBindings {
    if !receiver.is_generic_instance() {
        return GenericBindings::new();
    }
    class
        .generic_params
        .iter()
        .cloned()
        .zip(receiver.generic_args().iter().cloned())
        .collect()
}

/// Replaces bound generic parameters, recursing through generic instances
/// and array elements.
pub fn substitute(ty: &TypeDecl, bindings: &GenericBindings) -> TypeDecl {
    match ty {
        TypeDecl::GenericParam(name) => bindings.get(name).cloned().unwrap_or_else(|| ty.clone()),
        TypeDecl::GenericInstance { base, args } => TypeDecl::generic(
            substitute(base, bindings),
            args.iter().map(|arg| substitute(arg, bindings)).collect(),
        ),
        TypeDecl::Array { element, dimension } => TypeDecl::array(substitute(element, bindings), *dimension),
        _ => ty.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_of(k: TypeDecl, v: TypeDecl) -> TypeDecl {
        TypeDecl::generic(TypeDecl::class("HashMap"), vec![k, v])
    }

    #[test]
    fn binds_positionally() {
        let class = ClassSymbol::with_generic_params(&["K", "V"]);
        let bindings = bindings_for(&class, &map_of(TypeDecl::STRING, TypeDecl::INT));
        assert_eq!(bindings.get("K"), Some(&TypeDecl::STRING));
        assert_eq!(bindings.get("V"), Some(&TypeDecl::INT));
    }

    #[test]
    fn substitutes_nested_instances() {
        let mut bindings = GenericBindings::new();
        bindings.insert("T".to_string(), TypeDecl::DOUBLE);
        let nested = TypeDecl::generic(
            TypeDecl::class("ArrayList"),
            vec![TypeDecl::generic(TypeDecl::class("ArrayList"), vec![TypeDecl::generic_param("T")])],
        );
        assert_eq!(substitute(&nested, &bindings).to_string(), "ArrayList<ArrayList<double>>");
    }

    #[test]
    fn unbound_parameters_stay() {
        let ty = TypeDecl::generic_param("U");
        assert_eq!(substitute(&ty, &GenericBindings::new()), ty);
    }
}
