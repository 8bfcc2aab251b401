// Fri Oct 16 2026 - Alex

use crate::vm::DetectionError;
use std::any::Any;
use std::mem::{offset_of, size_of};

pub const SUPPORTED_WIDTHS: [u32; 2] = [4, 8];

/// Low-level measurements the detector needs from a runtime.
pub trait RuntimeProbe {
    fn name(&self) -> &str;
    fn native_address_width(&self) -> u32;
    /// Offset of the only field of a type holding a single boolean.
    fn header_probe_offset(&self) -> Result<u64, DetectionError>;
    /// Offsets of the two fields of a type holding exactly two references.
    fn reference_pair_offsets(&self) -> Result<(u64, u64), DetectionError>;
    /// Addresses of `count` freshly allocated minimal objects, each read back
    /// as a `width`-byte word.
    fn sample_addresses(&self, count: usize, width: u32) -> Result<Vec<u64>, DetectionError>;
}

pub fn decode_word(address: u64, width: u32) -> Result<u64, DetectionError> {
    match width {
        4 => Ok(address as u32 as u64),
        8 => Ok(address),
        other => Err(DetectionError::UnsupportedAddressWidth(other)),
    }
}

#[repr(C)]
struct HeaderProbe {
    flag: bool,
}

#[repr(C)]
struct ReferencePair {
    first: Option<Box<u8>>,
    second: Option<Box<u8>>,
}

/// Measures the current process: Rust objects have no header and references
/// are plain pointers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeProbe;

impl NativeProbe {
    pub fn new() -> Self {
        Self
    }
}

impl RuntimeProbe for NativeProbe {
    fn name(&self) -> &str {
        "native"
    }

    fn native_address_width(&self) -> u32 {
        size_of::<usize>() as u32
    }

    fn header_probe_offset(&self) -> Result<u64, DetectionError> {
        Ok(offset_of!(HeaderProbe, flag) as u64)
    }

    fn reference_pair_offsets(&self) -> Result<(u64, u64), DetectionError> {
        Ok((
            offset_of!(ReferencePair, first) as u64,
            offset_of!(ReferencePair, second) as u64,
        ))
    }

    fn sample_addresses(&self, count: usize, width: u32) -> Result<Vec<u64>, DetectionError> {
        if !SUPPORTED_WIDTHS.contains(&width) {
            return Err(DetectionError::UnsupportedAddressWidth(width));
        }

        // Three differently sized minimal objects, kept alive until read back.
        let mut slots: Vec<Box<dyn Any>> = Vec::with_capacity(count);
        for c in 0..count {
            match c % 3 {
                0 => slots.push(Box::new(c as u8)),
                1 => slots.push(Box::new(c as u32)),
                _ => slots.push(Box::new(c as u64)),
            }
        }

        slots
            .iter()
            .map(|slot| {
                let address = &**slot as *const dyn Any as *const u8 as usize as u64;
                decode_word(address, width)
            })
            .collect()
    }
}
