use std::collections::BTreeSet;

use frontend::ast::TypeRef;

use crate::CppGenError;

pub const CMATH: &str = "#include <cmath>";
pub const IOMANIP: &str = "#include <iomanip>";
pub const IOSTREAM: &str = "#include <iostream>";
pub const SSTREAM: &str = "#include <sstream>";
pub const STRING: &str = "#include <string>";
pub const VECTOR: &str = "#include <vector>";
pub const UNORDERED_MAP: &str = "#include <unordered_map>";

/// Header lines the generated file needs, kept sorted.
pub type IncludeSet = BTreeSet<&'static str>;

/// Primitive name behind a boxed class name; other names pass through.
pub fn unboxed(name: &str) -> &str {
    match name {
        "Integer" => "int",
        "Double" => "double",
        "Float" => "float",
        "Character" => "char",
        "Boolean" => "boolean",
        other => other,
    }
}

fn primitive(name: &str) -> Option<&'static str> {
    let cpp = match unboxed(name) {
        "int" => "int",
        "float" => "float",
        "double" => "double",
        "char" => "char",
        "boolean" => "bool",
        "void" => "void",
        "String" => "std::string",
        _ => return None,
    };
    Some(cpp)
}

/// Maps a source type onto its C++ spelling, recording the headers it needs.
/// Arrays become `std::vector` of their element type, one level per dimension.
pub fn cpp_type(ty: &TypeRef, includes: &mut IncludeSet) -> Result<String, CppGenError> {
    let mut rendered = element_type(ty, includes)?;
    if ty.dimensions > 0 {
        includes.insert(VECTOR);
    }
    for _ in 0..ty.dimensions {
        rendered = format!("std::vector<{}>", rendered);
    }
    Ok(rendered)
}

fn element_type(ty: &TypeRef, includes: &mut IncludeSet) -> Result<String, CppGenError> {
    if let Some(cpp) = primitive(&ty.name) {
        if cpp == "std::string" {
            includes.insert(STRING);
        }
        return Ok(cpp.to_string());
    }

    let (template, header, arity) = match ty.name.as_str() {
        "ArrayList" => ("std::vector", VECTOR, 1),
        "HashMap" => ("std::unordered_map", UNORDERED_MAP, 2),
        other => {
            return Err(CppGenError::Unsupported(format!(
                "values of user-defined class {}",
                other
            )))
        }
    };
    if ty.args.len() != arity {
        return Err(CppGenError::Unsupported(format!("raw container type {}", ty)));
    }
    includes.insert(header);

    let args = ty
        .args
        .iter()
        .map(|arg| cpp_type(arg, includes))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("{}<{}>", template, args.join(", ")))
}

/// Containers whose `new` initialiser is dropped from declarations,
/// since a default-constructed C++ container is already empty.
pub fn is_container(ty: &TypeRef) -> bool {
    ty.dimensions == 0 && matches!(ty.name.as_str(), "ArrayList" | "HashMap")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn string() -> TypeRef {
        TypeRef::simple("String")
    }

    #[rstest]
    #[case(TypeRef::simple("int"), "int")]
    #[case(TypeRef::simple("boolean"), "bool")]
    #[case(TypeRef::simple("Integer"), "int")]
    #[case(string(), "std::string")]
    #[case(TypeRef::simple("double").array_of(1), "std::vector<double>")]
    #[case(TypeRef::simple("int").array_of(2), "std::vector<std::vector<int>>")]
    #[case(TypeRef::generic("ArrayList", vec![string()]), "std::vector<std::string>")]
    #[case(
        TypeRef::generic("HashMap", vec![string(), TypeRef::simple("Integer")]),
        "std::unordered_map<std::string, int>"
    )]
    #[case(
        TypeRef::generic("ArrayList", vec![TypeRef::generic("ArrayList", vec![TypeRef::simple("Character")])]),
        "std::vector<std::vector<char>>"
    )]
    #[case(TypeRef::generic("ArrayList", vec![string()]).array_of(1), "std::vector<std::vector<std::string>>")]
    fn maps_types(#[case] ty: TypeRef, #[case] expected: &str) {
        let mut includes = IncludeSet::new();
        assert_eq!(cpp_type(&ty, &mut includes).unwrap(), expected);
    }

    #[test]
    fn records_headers() {
        let mut includes = IncludeSet::new();
        let map = TypeRef::generic("HashMap", vec![string(), TypeRef::simple("int").array_of(1)]);
        cpp_type(&map, &mut includes).unwrap();
        assert_eq!(
            includes.into_iter().collect::<Vec<_>>(),
            vec![STRING, UNORDERED_MAP, VECTOR]
        );
    }

    #[test]
    fn rejects_user_classes_and_raw_containers() {
        let mut includes = IncludeSet::new();
        let err = cpp_type(&TypeRef::simple("Point"), &mut includes).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported construct: values of user-defined class Point");
        let err = cpp_type(&TypeRef::simple("ArrayList"), &mut includes).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported construct: raw container type ArrayList");
    }
}
