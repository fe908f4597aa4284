#![macro_use]

macro_rules! impl_table_id {
    ($idtype: ident) => {
        impl $idtype {
            /// NULL value for the type
            pub const NULL: $idtype = Self(-1);
        }

        impl $crate::traits::private_traits::TableIdPrivate for $idtype {
            fn new(value: $crate::newtypes::TablesIdInteger) -> Self {
                Self(value)
            }

            fn new_null() -> Self {
                Self(-1)
            }

            fn raw(&self) -> $crate::newtypes::TablesIdInteger {
                self.0
            }
        }

        impl $crate::traits::TableId for $idtype {
            fn is_null(&self) -> bool {
                *self == Self::NULL
            }
        }

        impl $crate::traits::TableTypeIntoRaw for $idtype {
            type RawType = $crate::newtypes::TablesIdInteger;
            fn into_raw(self) -> Self::RawType {
                self.0
            }
        }

        impl std::fmt::Display for $idtype {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$crate::newtypes::TablesIdInteger> for $idtype {
            fn from(value: $crate::newtypes::TablesIdInteger) -> Self {
                if value >= 0 {
                    Self(value)
                } else {
                    Self::NULL
                }
            }
        }

        impl From<usize> for $idtype {
            fn from(value: usize) -> Self {
                match $crate::newtypes::TablesIdInteger::try_from(value) {
                    Ok(x) => Self(x),
                    Err(_) => Self::NULL,
                }
            }
        }

        impl From<$idtype> for usize {
            fn from(value: $idtype) -> Self {
                value.0 as Self
            }
        }

        impl From<$idtype> for $crate::newtypes::TablesIdInteger {
            fn from(item: $idtype) -> Self {
                item.0
            }
        }

        impl PartialEq<$crate::newtypes::TablesIdInteger> for $idtype {
            fn eq(&self, other: &$crate::newtypes::TablesIdInteger) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<$idtype> for $crate::newtypes::TablesIdInteger {
            fn eq(&self, other: &$idtype) -> bool {
                *self == other.0
            }
        }

        impl PartialOrd<$crate::newtypes::TablesIdInteger> for $idtype {
            fn partial_cmp(
                &self,
                other: &$crate::newtypes::TablesIdInteger,
            ) -> Option<std::cmp::Ordering> {
                self.0.partial_cmp(other)
            }
        }

        impl PartialOrd<$idtype> for $crate::newtypes::TablesIdInteger {
            fn partial_cmp(&self, other: &$idtype) -> Option<std::cmp::Ordering> {
                self.partial_cmp(&other.0)
            }
        }
    };
}
