use pdfcid_core::CidSystemInfo;

use super::{CMapTable, CodespaceRange};

const IDENTITY_CODESPACE: [CodespaceRange; 1] = [CodespaceRange {
    byte_len: 2,
    low: 0x0000,
    high: 0xFFFF,
}];

/// `Identity-H` / `Identity-V`: two-byte codes equal to the CID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityCMap {
    vertical: bool,
    system_info: CidSystemInfo,
}

impl IdentityCMap {
    pub fn horizontal() -> Self {
        Self::new(false)
    }

    pub fn vertical() -> Self {
        Self::new(true)
    }

    pub fn new(vertical: bool) -> Self {
        Self {
            vertical,
            system_info: CidSystemInfo::identity(),
        }
    }

    /// Build from a CMap name, `None` unless it is `Identity-H`/`Identity-V`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Identity-H" => Some(Self::horizontal()),
            "Identity-V" => Some(Self::vertical()),
            _ => None,
        }
    }
}

impl CMapTable for IdentityCMap {
    fn name(&self) -> &str {
        if self.vertical {
            "Identity-V"
        } else {
            "Identity-H"
        }
    }

    fn system_info(&self) -> &CidSystemInfo {
        &self.system_info
    }

    fn is_direct(&self) -> bool {
        true
    }

    fn is_vertical(&self) -> bool {
        self.vertical
    }

    fn codespace_ranges(&self) -> &[CodespaceRange] {
        &IDENTITY_CODESPACE
    }

    fn code_to_cid(&self, code: u32) -> Option<u32> {
        Some(code)
    }

    fn cid_to_code(&self, cid: u32) -> Option<(u32, usize)> {
        Some((cid & 0xFFFF, 2))
    }
}
