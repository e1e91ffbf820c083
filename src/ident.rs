//
//  ident.rs
//  Depend
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// Position of the entity in its model arena.
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// Handle of a class or interface inside a [`CodeModel`](crate::CodeModel).
    TypeId,
    "type"
);
arena_id!(
    /// Handle of a method or type constant.
    MemberId,
    "member"
);
arena_id!(
    /// Handle of a package (namespace).
    PackageId,
    "package"
);
arena_id!(
    /// Handle of a package-level function.
    FunctionId,
    "function"
);

/// Process-unique identity of a declared entity.
///
/// Arena handles are only meaningful inside the model that issued them,
/// the uuid stays valid when entities are reported or compared across runs
/// of the same session.
pub fn new_uuid() -> Uuid {
    Uuid::new_v4()
}

/// Case-insensitive key used by the symbol table.
///
/// Leading namespace separators are dropped so `\Foo\Bar` and `foo\bar`
/// name the same type.
pub fn symbol_key(name: &str) -> String {
    name.trim_start_matches('\\').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_key_normalizes_case_and_leading_separator() {
        assert_eq!(symbol_key("\\Foo\\Bar"), "foo\\bar");
        assert_eq!(symbol_key("foo\\BAR"), "foo\\bar");
        assert_eq!(symbol_key("Animal"), "animal");
    }

    #[test]
    fn test_uuids_are_unique() {
        assert_ne!(new_uuid(), new_uuid());
    }

    #[test]
    fn test_display_includes_prefix() {
        assert_eq!(TypeId(3).to_string(), "type#3");
        assert_eq!(MemberId(0).to_string(), "member#0");
        assert_eq!(PackageId(7).index(), 7);
    }
}
