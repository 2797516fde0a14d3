use crate::symbol_table::{ClassSymbol, Symbol, SymbolTable};
use crate::type_decl::TypeDecl;

/// Boxed class names accepted wherever their primitive is.
pub const BOXED_TYPES: &[(&str, TypeDecl)] = &[
    ("Integer", TypeDecl::INT),
    ("Double", TypeDecl::DOUBLE),
    ("Float", TypeDecl::FLOAT),
    ("Character", TypeDecl::CHAR),
    ("Boolean", TypeDecl::BOOLEAN),
];

pub const PRIMITIVE_TYPES: &[(&str, TypeDecl)] = &[
    ("boolean", TypeDecl::BOOLEAN),
    ("char", TypeDecl::CHAR),
    ("int", TypeDecl::INT),
    ("float", TypeDecl::FLOAT),
    ("double", TypeDecl::DOUBLE),
    ("void", TypeDecl::Void),
    ("String", TypeDecl::STRING),
];

pub fn primitive_type(name: &str) -> Option<TypeDecl> {
    PRIMITIVE_TYPES
        .iter()
        .chain(BOXED_TYPES)
        .find(|(n, _)| *n == name)
        .map(|(_, ty)| ty.clone())
}

fn method(class: &mut ClassSymbol, name: &str, return_type: TypeDecl, params: &[(&str, TypeDecl)]) {
    let params = params.iter().map(|(n, ty)| (n.to_string(), ty.clone())).collect();
    class.members.define(Symbol::method(name, return_type, params));
}

/// Global scope seeded with the primitive pseudo-classes, `System.out`,
/// `PrintStream`, `String` methods and the two generic containers.
pub fn builtin_global_scope() -> SymbolTable {
    let mut global = SymbolTable::new();

    for (name, _) in PRIMITIVE_TYPES.iter().filter(|(n, _)| *n != "String") {
        global.define(Symbol::class(*name, ClassSymbol::new()));
    }

    let mut string = ClassSymbol::new();
    method(&mut string, "length", TypeDecl::INT, &[]);
    method(&mut string, "charAt", TypeDecl::CHAR, &[("index", TypeDecl::INT)]);
    method(&mut string, "equals", TypeDecl::BOOLEAN, &[("other", TypeDecl::STRING)]);
    method(&mut string, "isEmpty", TypeDecl::BOOLEAN, &[]);
    global.define(Symbol::class("String", string));

    let mut print_stream = ClassSymbol::new();
    method(&mut print_stream, "println", TypeDecl::Void, &[("value", TypeDecl::STRING)]);
    method(&mut print_stream, "print", TypeDecl::Void, &[("value", TypeDecl::STRING)]);
    global.define(Symbol::class("PrintStream", print_stream));

    let mut system = ClassSymbol::new();
    system
        .members
        .define(Symbol::variable("out", TypeDecl::class("PrintStream")));
    global.define(Symbol::class("System", system));

    let t = TypeDecl::generic_param("T");
    let mut array_list = ClassSymbol::with_generic_params(&["T"]);
    method(&mut array_list, "size", TypeDecl::INT, &[]);
    method(&mut array_list, "get", t.clone(), &[("index", TypeDecl::INT)]);
    method(&mut array_list, "add", TypeDecl::BOOLEAN, &[("element", t.clone())]);
    method(&mut array_list, "set", t.clone(), &[("index", TypeDecl::INT), ("element", t)]);
    method(&mut array_list, "isEmpty", TypeDecl::BOOLEAN, &[]);
    global.define(Symbol::class("ArrayList", array_list));

    let k = TypeDecl::generic_param("K");
    let v = TypeDecl::generic_param("V");
    let mut hash_map = ClassSymbol::with_generic_params(&["K", "V"]);
    method(&mut hash_map, "put", TypeDecl::Void, &[("key", k.clone()), ("value", v.clone())]);
    method(&mut hash_map, "get", v, &[("key", k.clone())]);
    method(&mut hash_map, "containsKey", TypeDecl::BOOLEAN, &[("key", k)]);
    method(&mut hash_map, "size", TypeDecl::INT, &[]);
    global.define(Symbol::class("HashMap", hash_map));

    global
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containers_are_generic() {
        let global = builtin_global_scope();
        let list = global.resolve_locally("ArrayList").and_then(Symbol::as_class).unwrap();
        assert_eq!(list.generic_params, vec!["T".to_string()]);
        let get = list.members.resolve_locally("get").unwrap();
        assert_eq!(get.ty, TypeDecl::generic_param("T"));
    }

    #[test]
    fn boxed_names_map_to_primitives() {
        assert_eq!(primitive_type("Integer"), Some(TypeDecl::INT));
        assert_eq!(primitive_type("String"), Some(TypeDecl::STRING));
        assert_eq!(primitive_type("Foo"), None);
    }
}
