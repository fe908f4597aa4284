pub(crate) mod private_traits {
    pub trait TableIdPrivate {
        fn new(value: crate::newtypes::TablesIdInteger) -> Self;
        fn new_null() -> Self;
        fn raw(&self) -> crate::newtypes::TablesIdInteger;
    }
}

/// An integer-like object referring to a table row.
/// Trait objects can be `NULL`, indicating that
/// there is no row associated with the object.
///
/// This trait cannot be implemented for types not
/// defined in this crate because it requires a
/// private super-trait.
pub trait TableId: std::fmt::Debug + private_traits::TableIdPrivate {
    /// Return true if `self` is equal to the
    /// type's `NULL` value.
    fn is_null(&self) -> bool;
}

/// Conversion of a newtype into its low-level representation.
pub trait TableTypeIntoRaw {
    /// The underlying type
    type RawType;

    /// Return the underlying value
    fn into_raw(self) -> Self::RawType;
}
