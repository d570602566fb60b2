//! FileHeader parsing for HWP 5.0 documents.
//!
//! The header is a fixed 256-byte stream: a NUL-padded signature, the
//! version in reversed byte order, and a 32-bit property word.

use crate::error::{Error, Protection, Result};

/// HWP 5.0 file header signature.
pub const HWP_SIGNATURE: &str = "HWP Document File";

/// FileHeader size is always 256 bytes.
pub const FILE_HEADER_SIZE: usize = 256;

const SIGNATURE_LEN: usize = 32;
const VERSION_OFFSET: usize = 32;
const PROPERTIES_OFFSET: usize = 36;

/// Document property bits of the header, in bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Compressed,
    Encrypted,
    Distribution,
    Script,
    Drm,
    XmlTemplate,
    History,
    Signature,
    CertificateEncryption,
    SignatureReserved,
    CertificateDrm,
    Ccl,
    Mobile,
    PrivacyProtection,
    TrackChanges,
    Kogl,
}

impl Capability {
    /// All capabilities, indexed by bit position.
    pub const ALL: [Capability; 16] = [
        Capability::Compressed,
        Capability::Encrypted,
        Capability::Distribution,
        Capability::Script,
        Capability::Drm,
        Capability::XmlTemplate,
        Capability::History,
        Capability::Signature,
        Capability::CertificateEncryption,
        Capability::SignatureReserved,
        Capability::CertificateDrm,
        Capability::Ccl,
        Capability::Mobile,
        Capability::PrivacyProtection,
        Capability::TrackChanges,
        Capability::Kogl,
    ];

    /// Bit mask within the property word.
    pub fn mask(self) -> u32 {
        1 << self as u32
    }
}

/// HWP 5.0 FileHeader structure.
#[derive(Debug, Clone)]
pub struct FileHeader {
    /// Document version (major.minor.build.revision)
    pub version: Version,
    /// Property flags
    pub properties: u32,
}

impl FileHeader {
    /// Parses a FileHeader from raw bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < FILE_HEADER_SIZE {
            return Err(Error::FileHeaderTooSmall { len: data.len() });
        }

        let raw = &data[..SIGNATURE_LEN];
        let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        let signature = String::from_utf8_lossy(&raw[..end]);
        if signature != HWP_SIGNATURE {
            return Err(Error::InvalidSignature(signature.into_owned()));
        }

        let [revision, build, minor, major] = [
            data[VERSION_OFFSET],
            data[VERSION_OFFSET + 1],
            data[VERSION_OFFSET + 2],
            data[VERSION_OFFSET + 3],
        ];
        let properties = u32::from_le_bytes([
            data[PROPERTIES_OFFSET],
            data[PROPERTIES_OFFSET + 1],
            data[PROPERTIES_OFFSET + 2],
            data[PROPERTIES_OFFSET + 3],
        ]);

        Ok(Self {
            version: Version::new(major, minor, build, revision),
            properties,
        })
    }

    /// Rejects documents whose protection cannot be decoded.
    ///
    /// Encryption is reported before DRM.
    pub fn check_protection(&self) -> Result<()> {
        if self.has(Capability::Encrypted) {
            return Err(Error::UnsupportedProtection(Protection::Encrypted));
        }
        if self.has(Capability::Drm) {
            return Err(Error::UnsupportedProtection(Protection::Drm));
        }
        Ok(())
    }

    /// Returns the version as a string (e.g., "5.1.0.1").
    pub fn version_string(&self) -> String {
        self.version.to_string()
    }

    /// Returns true if the property bit is set.
    pub fn has(&self, capability: Capability) -> bool {
        self.properties & capability.mask() != 0
    }

    /// Lists the set property bits.
    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL.into_iter().filter(|&c| self.has(c)).collect()
    }

    pub fn is_compressed(&self) -> bool {
        self.has(Capability::Compressed)
    }

    pub fn is_encrypted(&self) -> bool {
        self.has(Capability::Encrypted)
    }

    pub fn is_distribution(&self) -> bool {
        self.has(Capability::Distribution)
    }

    pub fn is_drm_protected(&self) -> bool {
        self.has(Capability::Drm)
    }
}

/// HWP document version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub build: u8,
    pub revision: u8,
}

impl Version {
    pub fn new(major: u8, minor: u8, build: u8, revision: u8) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Returns true if this version is at least the specified version.
    pub fn at_least(&self, major: u8, minor: u8, build: u8, revision: u8) -> bool {
        *self >= Version::new(major, minor, build, revision)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.build, self.revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(version: [u8; 4], flags: u32) -> Vec<u8> {
        let mut data = vec![0u8; FILE_HEADER_SIZE];
        data[..HWP_SIGNATURE.len()].copy_from_slice(HWP_SIGNATURE.as_bytes());
        data[32..36].copy_from_slice(&version);
        data[36..40].copy_from_slice(&flags.to_le_bytes());
        data
    }

    #[test]
    fn test_version_comparison() {
        let v = Version::new(5, 1, 0, 1);
        assert_eq!(v.to_string(), "5.1.0.1");
        assert!(v.at_least(5, 0, 0, 0));
        assert!(v.at_least(5, 1, 0, 1));
        assert!(!v.at_least(5, 1, 0, 2));
        assert!(!v.at_least(5, 2, 0, 0));
    }

    #[test]
    fn test_version_storage_order() {
        let header = FileHeader::parse(&header_bytes([0x00, 0x03, 0x00, 0x05], 0)).unwrap();
        assert_eq!(header.version, Version::new(5, 0, 3, 0));
        assert_eq!(header.version_string(), "5.0.3.0");
    }

    #[test]
    fn test_capability_bits() {
        let header = FileHeader::parse(&header_bytes([1, 0, 1, 5], 1)).unwrap();
        assert!(header.is_compressed());
        assert!(!header.is_encrypted());
        assert_eq!(header.capabilities(), vec![Capability::Compressed]);
        assert!(header.check_protection().is_ok());

        let all = FileHeader::parse(&header_bytes([0, 0, 0, 5], 0xFFFF)).unwrap();
        assert_eq!(all.capabilities().len(), 16);
        assert!(all.has(Capability::Kogl));
        assert_eq!(Capability::Kogl.mask(), 1 << 15);
        assert_eq!(Capability::Drm.mask(), 1 << 4);
        assert_eq!(Capability::CertificateDrm.mask(), 1 << 10);
    }

    #[test]
    fn test_invalid_signature() {
        let mut data = vec![0u8; FILE_HEADER_SIZE];
        data[..17].copy_from_slice(b"Invalid Signature");
        assert!(matches!(
            FileHeader::parse(&data),
            Err(Error::InvalidSignature(s)) if s == "Invalid Signature"
        ));
    }

    #[test]
    fn test_signature_with_trailing_garbage_rejected() {
        let mut data = header_bytes([0, 0, 0, 5], 0);
        data[20] = b'X';
        assert!(matches!(FileHeader::parse(&data), Err(Error::InvalidSignature(_))));
    }

    #[test]
    fn test_too_small() {
        assert!(matches!(
            FileHeader::parse(&[0u8; 100]),
            Err(Error::FileHeaderTooSmall { len: 100 })
        ));
    }

    #[test]
    fn test_protection_rejected() {
        let encrypted =
            FileHeader::parse(&header_bytes([0, 0, 0, 5], Capability::Encrypted.mask())).unwrap();
        assert!(matches!(
            encrypted.check_protection(),
            Err(Error::UnsupportedProtection(Protection::Encrypted))
        ));

        let both = Capability::Encrypted.mask() | Capability::Drm.mask();
        let both = FileHeader::parse(&header_bytes([0, 0, 0, 5], both)).unwrap();
        assert!(matches!(
            both.check_protection(),
            Err(Error::UnsupportedProtection(Protection::Encrypted))
        ));

        let drm = FileHeader::parse(&header_bytes([0, 0, 0, 5], Capability::Drm.mask())).unwrap();
        assert!(matches!(
            drm.check_protection(),
            Err(Error::UnsupportedProtection(Protection::Drm))
        ));
    }
}
