use std::fmt::Debug;

/// T values are primitive integers
pub trait PrimInt: ::num::PrimInt + Debug + Default {}
impl<T: ::num::PrimInt + Debug + Default> PrimInt for T {}

/// T values are non-negative primitive integers
pub trait PrimUInt: PrimInt + ::num::Unsigned {}
impl<T: PrimInt + ::num::Unsigned> PrimUInt for T {}

/// Signed fixed-width integers used to store wavefront offsets.
///
/// Narrow widths save fast-tier memory but cap the largest representable offset, so the
/// maximum read length must be validated against [`PrimInt::max_value`] before aligning.
/// Arithmetic is carried out on the widened `i32` value; the narrow type is only a storage
/// format.
pub trait Offset: PrimInt + ::num::Signed + Send + Sync + 'static {
    /// Size of the little-endian encoding in bytes.
    const BYTES: usize;

    /// Reserved "no coordinate" value. Half of the type minimum, so it loses to every real
    /// offset in `max` and stays far away from them.
    const NULL: Self;

    fn widen(self) -> i32;

    /// Narrows a widened value back into the storage type. Callers guarantee that the value
    /// is either the widened [`Offset::NULL`] or a validated sequence coordinate.
    fn narrow(value: i32) -> Self;

    fn write_le(self, dst: &mut [u8]);

    fn read_le(src: &[u8]) -> Self;

    #[inline(always)]
    fn is_null(self) -> bool {
        self == Self::NULL
    }
}

macro_rules! impl_offset {
    ($($t:ty),* $(,)?) => {
        $(
            impl Offset for $t {
                const BYTES: usize = std::mem::size_of::<$t>();
                const NULL: Self = <$t>::MIN / 2;

                #[inline(always)]
                fn widen(self) -> i32 {
                    self as i32
                }

                #[inline(always)]
                fn narrow(value: i32) -> Self {
                    debug_assert!(
                        value >= <$t>::MIN as i32 && value <= <$t>::MAX as i32,
                        "offset {value} does not fit into {}",
                        stringify!($t)
                    );
                    value as $t
                }

                #[inline(always)]
                fn write_le(self, dst: &mut [u8]) {
                    dst[..Self::BYTES].copy_from_slice(&self.to_le_bytes());
                }

                #[inline(always)]
                fn read_le(src: &[u8]) -> Self {
                    let mut bytes = [0u8; std::mem::size_of::<$t>()];
                    bytes.copy_from_slice(&src[..Self::BYTES]);
                    <$t>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_offset!(i8, i16, i32);
