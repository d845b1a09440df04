use safe_arith::SafeArith;

pub use alloy_primitives;

pub type Hash64 = alloy_primitives::B64;
pub type Hash256 = alloy_primitives::B256;
pub type Uint256 = alloy_primitives::U256;
pub type Address = alloy_primitives::Address;

pub trait UintExtended: Sized {
    fn to_i64(self) -> i64;
    fn safe_add_assign(&mut self, other: Self) -> Result<(), safe_arith::ArithError>;
}

pub trait FixedBytesExtended {
    fn from_low_u64_be(value: u64) -> Self;
    fn from_low_u64_le(value: u64) -> Self;
    fn zero() -> Self;
}

impl<const N: usize> FixedBytesExtended for alloy_primitives::FixedBytes<N> {
    fn from_low_u64_be(value: u64) -> Self {
        let value_bytes = value.to_be_bytes();
        let mut buffer = [0x0; N];
        let bytes_to_copy = value_bytes.len().min(buffer.len());
        // Panic-free because bytes_to_copy <= buffer.len()
        let start_index = buffer.len().saturating_sub(bytes_to_copy);
        // Panic-free because start_index <= buffer.len()
        // and bytes_to_copy <= value_bytes.len()
        buffer
            .get_mut(start_index..)
            .expect("start_index <= buffer.len()")
            .copy_from_slice(
                value_bytes
                    .get(value_bytes.len().saturating_sub(bytes_to_copy)..)
                    .expect("bytes_to_copy <= value_byte.len()"),
            );
        Self::from(buffer)
    }

    fn from_low_u64_le(value: u64) -> Self {
        let value_bytes = value.to_le_bytes();
        let mut buffer = [0x0; N];
        let bytes_to_copy = value_bytes.len().min(buffer.len());
        buffer
            .get_mut(..bytes_to_copy)
            .expect("bytes_to_copy <= buffer.len()")
            .copy_from_slice(
                value_bytes
                    .get(..bytes_to_copy)
                    .expect("bytes_to_copy <= value_byte.len()"),
            );
        Self::from(buffer)
    }

    fn zero() -> Self {
        Self::ZERO
    }
}

impl FixedBytesExtended for alloy_primitives::Address {
    fn from_low_u64_be(value: u64) -> Self {
        alloy_primitives::FixedBytes::<20>::from_low_u64_be(value).into()
    }

    fn from_low_u64_le(value: u64) -> Self {
        alloy_primitives::FixedBytes::<20>::from_low_u64_le(value).into()
    }

    fn zero() -> Self {
        alloy_primitives::FixedBytes::<20>::zero().into()
    }
}

impl UintExtended for Uint256 {
    /// Trims the most significant bits and converts the result to i64.
    fn to_i64(self) -> i64 {
        i64::from_le_bytes(
            self.to_le_bytes::<32>()[0..8]
                .try_into()
                .expect("8 bytes fit i64"),
        )
    }

    fn safe_add_assign(&mut self, other: Self) -> Result<(), safe_arith::ArithError> {
        *self = self.safe_add(other)?;
        Ok(())
    }
}

impl SafeArith for Uint256 {
    const ZERO: Self = Uint256::ZERO;
    const ONE: Self = Uint256::ONE;

    fn safe_add(&self, other: Self) -> safe_arith::Result<Self> {
        self.checked_add(other)
            .ok_or(safe_arith::ArithError::Overflow)
    }

    fn safe_sub(&self, other: Self) -> safe_arith::Result<Self> {
        self.checked_sub(other)
            .ok_or(safe_arith::ArithError::Overflow)
    }

    fn safe_mul(&self, other: Self) -> safe_arith::Result<Self> {
        self.checked_mul(other)
            .ok_or(safe_arith::ArithError::Overflow)
    }

    fn safe_div(&self, other: Self) -> safe_arith::Result<Self> {
        self.checked_div(other)
            .ok_or(safe_arith::ArithError::DivisionByZero)
    }

    fn safe_rem(&self, other: Self) -> safe_arith::Result<Self> {
        self.checked_rem(other)
            .ok_or(safe_arith::ArithError::DivisionByZero)
    }

    fn safe_shl(&self, other: u32) -> safe_arith::Result<Self> {
        self.checked_shl(other as usize)
            .ok_or(safe_arith::ArithError::Overflow)
    }

    fn safe_shr(&self, other: u32) -> safe_arith::Result<Self> {
        self.checked_shr(other as usize)
            .ok_or(safe_arith::ArithError::Overflow)
    }
}

#[cfg(test)]
mod test {
    use super::{FixedBytesExtended, Hash256};

    #[test]
    fn from_low_u64_be_is_trailing() {
        let h = Hash256::from_low_u64_be(0xff01);
        assert_eq!(h.as_slice()[31], 0x01);
        assert_eq!(h.as_slice()[30], 0xff);
        assert!(h.as_slice()[..30].iter().all(|b| *b == 0));
    }

    #[test]
    fn from_low_u64_le_is_leading() {
        let h = Hash256::from_low_u64_le(0xff01);
        assert_eq!(h.as_slice()[0], 0x01);
        assert_eq!(h.as_slice()[1], 0xff);
        assert!(h.as_slice()[2..].iter().all(|b| *b == 0));
    }
}
