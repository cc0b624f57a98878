//! Helper macro for generating domain port error enums.
//!
//! Port errors share one shape: a thiserror enum with struct variants and a
//! snake_case constructor per variant that accepts `impl Into<T>` for each
//! field. The macro keeps the adapters' error surfaces uniform without
//! hand-writing the constructors.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum SampleLedgerError {
            Connection { message: String } => "ledger connection failed: {message}",
            Duplicate => "duplicate ledger entry",
            Timeout { seconds: u32 } => "ledger timed out after {seconds}s",
        }
    }

    #[test]
    fn string_field_constructor_accepts_str() {
        let err = SampleLedgerError::connection("refused");
        assert_eq!(err.to_string(), "ledger connection failed: refused");
    }

    #[test]
    fn unit_variant_constructor_exists() {
        assert_eq!(
            SampleLedgerError::duplicate().to_string(),
            "duplicate ledger entry"
        );
    }

    #[test]
    fn non_string_fields_keep_their_type() {
        assert_eq!(
            SampleLedgerError::timeout(30_u32).to_string(),
            "ledger timed out after 30s"
        );
    }
}
