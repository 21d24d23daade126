//! Declarative converters for buffer-borne and schema-defined types.

/// Expands to the `FfiType`, `lower` and `try_lift` items of an [`FfiConverter`] impl for a
/// type that travels inside a [`RustBuffer`].
///
/// [`FfiConverter`]: crate::FfiConverter
/// [`RustBuffer`]: crate::RustBuffer
#[macro_export]
macro_rules! buffer_lift_lower {
    () => {
        type FfiType = $crate::RustBuffer;

        fn lower<A: $crate::BufferAllocator + ?Sized>(
            obj: Self,
            alloc: &A,
        ) -> $crate::ProtocolResult<$crate::RustBuffer> {
            $crate::convert::lower_into_rust_buffer(&obj, alloc)
        }

        fn try_lift<A: $crate::BufferAllocator + ?Sized>(
            buf: $crate::RustBuffer,
            alloc: &A,
        ) -> $crate::ProtocolResult<Self> {
            $crate::convert::try_lift_from_rust_buffer(buf, alloc)
        }
    };
}

/// Implements [`FfiConverter`](crate::FfiConverter) for a struct, encoding its fields in the
/// listed order with no tags, padding or overall length.
///
/// ```
/// use bridge_abi::ffi_converter_record;
///
/// #[derive(Debug, PartialEq)]
/// pub struct Invoice {
///     pub amount_sats: u64,
///     pub memo: Option<String>,
/// }
///
/// ffi_converter_record!(Invoice {
///     amount_sats: u64,
///     memo: Option<String>,
/// });
/// ```
#[macro_export]
macro_rules! ffi_converter_record {
    ($ty:ident { $($field:ident : $fty:ty),* $(,)? }) => {
        impl $crate::FfiConverter for $ty {
            $crate::buffer_lift_lower!();

            #[allow(unused_variables)]
            fn write(
                obj: &Self,
                cursor: &mut $crate::WriteCursor<'_>,
            ) -> $crate::ProtocolResult<()> {
                $(<$fty as $crate::FfiConverter>::write(&obj.$field, cursor)?;)*
                Ok(())
            }

            #[allow(unused_variables)]
            fn try_read(cursor: &mut $crate::ReadCursor<'_>) -> $crate::ProtocolResult<Self> {
                Ok($ty {
                    $($field: <$fty as $crate::FfiConverter>::try_read(cursor)?,)*
                })
            }

            #[allow(unused_variables)]
            fn allocation_size(obj: &Self) -> u64 {
                0 $(+ <$fty as $crate::FfiConverter>::allocation_size(&obj.$field))*
            }
        }
    };
}

/// Implements [`FfiConverter`](crate::FfiConverter) for an enum: a 4-byte discriminant
/// followed by the variant's named fields in the listed order. Discriminants are written
/// out explicitly and are 1-based. Plain enums are the case where no variant has fields.
///
/// ```
/// use bridge_abi::ffi_converter_enum;
///
/// #[derive(Debug, PartialEq)]
/// pub enum PaymentState {
///     Pending,
///     Settled { preimage: String },
/// }
///
/// ffi_converter_enum!(PaymentState {
///     1 => Pending,
///     2 => Settled { preimage: String },
/// });
/// ```
#[macro_export]
macro_rules! ffi_converter_enum {
    ($ty:ident { $($disc:literal => $variant:ident $({ $($field:ident : $fty:ty),* $(,)? })?),* $(,)? }) => {
        impl $crate::FfiConverter for $ty {
            $crate::buffer_lift_lower!();

            fn write(
                obj: &Self,
                cursor: &mut $crate::WriteCursor<'_>,
            ) -> $crate::ProtocolResult<()> {
                match obj {
                    $(
                        $ty::$variant $({ $($field),* })? => {
                            cursor.put_i32($disc)?;
                            $($(<$fty as $crate::FfiConverter>::write($field, cursor)?;)*)?
                        }
                    )*
                }
                Ok(())
            }

            fn try_read(cursor: &mut $crate::ReadCursor<'_>) -> $crate::ProtocolResult<Self> {
                match cursor.read_i32()? {
                    $(
                        $disc => Ok($ty::$variant $({
                            $($field: <$fty as $crate::FfiConverter>::try_read(cursor)?),*
                        })?),
                    )*
                    value => Err($crate::ProtocolError::InvalidDiscriminant {
                        type_name: stringify!($ty),
                        value,
                    }),
                }
            }

            fn allocation_size(obj: &Self) -> u64 {
                match obj {
                    $(
                        $ty::$variant $({ $($field),* })? => {
                            4 $($(+ <$fty as $crate::FfiConverter>::allocation_size($field))*)?
                        }
                    )*
                }
            }
        }
    };
}
