//! Kernel selection and architecture detection

use std::fmt;

/// The target architecture of the 4-lane batching used by the vectorized kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    /// Intel/AMD x86_64, SSE lanes
    X86Sse,
    /// ARM aarch64, NEON lanes
    ArmNeon,
    /// Portable four-element arrays
    Generic,
}

impl Architecture {
    /// Check if this architecture has hardware SIMD lanes
    pub fn has_simd_support(&self) -> bool {
        !matches!(self, Architecture::Generic)
    }

    /// Name of the lane implementation compiled for this architecture
    pub fn lane_backend(&self) -> &'static str {
        match self {
            Architecture::X86Sse => "sse",
            Architecture::ArmNeon => "neon",
            Architecture::Generic => "scalar",
        }
    }
}

/// Detects the current CPU architecture
pub fn detect_architecture() -> Architecture {
    #[cfg(target_arch = "x86_64")]
    {
        // SSE is part of the x86_64 baseline
        return Architecture::X86Sse;
    }

    #[cfg(target_arch = "aarch64")]
    {
        // NEON is part of the aarch64 baseline
        return Architecture::ArmNeon;
    }

    #[allow(unreachable_code)]
    Architecture::Generic
}

/// The multiplication kernel to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kernel {
    /// Scalar merge-join over the transposed right operand
    Linear,
    /// Merge-join with products summed four lanes at a time
    Vectorized,
    /// Direct lookup without transpose, no sortedness requirement
    Naive,
}

impl Kernel {
    /// All kernels in command-line order
    pub const ALL: [Kernel; 3] = [Kernel::Linear, Kernel::Vectorized, Kernel::Naive];

    /// Kernel for a command-line number (0, 1 or 2)
    pub fn from_index(index: u8) -> Option<Kernel> {
        Self::ALL.get(index as usize).copied()
    }

    /// Command-line number of this kernel
    pub fn index(&self) -> u8 {
        match self {
            Kernel::Linear => 0,
            Kernel::Vectorized => 1,
            Kernel::Naive => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Kernel::Linear => "linear",
            Kernel::Vectorized => "vectorized",
            Kernel::Naive => "naive",
        }
    }

    /// Whether the kernel requires ascending indices in every row
    pub fn requires_sorted_rows(&self) -> bool {
        !matches!(self, Kernel::Naive)
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.index(), self.name())
    }
}

/// Configuration for a multiplication
#[derive(Debug, Clone)]
pub struct MultiplyConfig {
    /// Kernel to run
    pub kernel: Kernel,

    /// Architecture the lane implementation was compiled for
    pub architecture: Architecture,
}

impl Default for MultiplyConfig {
    fn default() -> Self {
        Self::for_kernel(Kernel::Linear)
    }
}

impl MultiplyConfig {
    /// Create a config running `kernel` on the detected architecture
    pub fn for_kernel(kernel: Kernel) -> Self {
        Self {
            kernel,
            architecture: detect_architecture(),
        }
    }
}
