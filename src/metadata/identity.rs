//! Assembly identities.
//!
//! An assembly is identified by its simple name, its four-part version, its culture and the
//! token of the public key it was signed with. [`AssemblyIdentity`] carries all four and is the
//! cache key of [`crate::AssemblyLoadContext`]; culture is informational and does not take part
//! in equality.
//!
//! # Public key tokens
//!
//! `Assembly` rows store the full public key, `AssemblyRef` rows usually store only its token:
//! the last 8 bytes of the key's hash, in reverse order. [`PublicKeyToken::from_public_key`]
//! computes the token with SHA-1 (or MD5 when the hash algorithm asks for it), so both forms
//! compare equal.
//!
//! # Example
//! ```rust
//! use dotmeta::{AssemblyIdentity, AssemblyVersion, PublicKeyToken};
//!
//! // The ECMA standard key, used by the core library
//! let ecma_key = [0, 0, 0, 0, 0, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0];
//! let token = PublicKeyToken::from_public_key(&ecma_key, 0)?;
//! assert_eq!(token.to_string(), "b77a5c561934e089");
//!
//! let identity = AssemblyIdentity::new("mscorlib", AssemblyVersion::new(4, 0, 0, 0))
//!     .with_public_key_token(token);
//! assert!(identity.is_core_library());
//! # Ok::<(), dotmeta::Error>(())
//! ```

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use bitflags::bitflags;
use md5::{Digest, Md5};
use sha1::Sha1;

use crate::{
    metadata::tables::{AssemblyRaw, AssemblyRefRaw},
    Error, Result,
};

/// Simple names under which the core library ships.
pub const CORE_LIBRARY_NAMES: [&str; 4] = [
    "mscorlib",
    "System.Runtime",
    "netstandard",
    "System.Private.CoreLib",
];

/// Whether `name` is one of the [`CORE_LIBRARY_NAMES`].
#[must_use]
pub fn is_core_library_name(name: &str) -> bool {
    CORE_LIBRARY_NAMES
        .iter()
        .any(|core| core.eq_ignore_ascii_case(name))
}

#[allow(non_snake_case)]
/// Values of the `HashAlgId` column of the `Assembly` table (II.23.1.1)
pub mod AssemblyHashAlgorithm {
    /// No hash algorithm specified
    pub const NONE: u32 = 0x0000;
    /// MD5
    pub const MD5: u32 = 0x8003;
    /// SHA-1
    pub const SHA1: u32 = 0x8004;
}

bitflags! {
    /// `AssemblyFlags` (II.23.1.2), carried by `Assembly` and `AssemblyRef` rows.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AssemblyFlags: u32 {
        /// The blob holds the full public key rather than its token
        const PUBLIC_KEY = 0x0001;
        /// The implementation may be retargeted at runtime
        const RETARGETABLE = 0x0100;
        /// A Windows Runtime assembly
        const WINDOWS_RUNTIME = 0x0200;
        /// Reserved
        const DISABLE_JIT_COMPILE_OPTIMIZER = 0x4000;
        /// Reserved
        const ENABLE_JIT_COMPILE_TRACKING = 0x8000;
    }
}

/// A four-part assembly version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AssemblyVersion {
    /// Major version
    pub major: u16,
    /// Minor version
    pub minor: u16,
    /// Build number
    pub build: u16,
    /// Revision number
    pub revision: u16,
}

impl AssemblyVersion {
    /// Create a version from its four parts.
    #[must_use]
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        AssemblyVersion {
            major,
            minor,
            build,
            revision,
        }
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// The 8-byte token of a strong-name public key, in display order.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKeyToken(pub [u8; 8]);

impl PublicKeyToken {
    /// Take a token as stored in an `AssemblyRef` blob.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] unless `data` is exactly 8 bytes long.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        match <[u8; 8]>::try_from(data) {
            Ok(bytes) => Ok(PublicKeyToken(bytes)),
            Err(_) => Err(malformed_error!(
                "Public key token must be 8 bytes, got {}",
                data.len()
            )),
        }
    }

    /// Compute the token of a full public key.
    ///
    /// `hash_alg` is the `HashAlgId` of the assembly; anything but MD5 hashes with SHA-1.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for an empty key and [`crate::Error::NotSupported`]
    /// for an unknown hash algorithm.
    pub fn from_public_key(public_key: &[u8], hash_alg: u32) -> Result<Self> {
        if public_key.is_empty() {
            return Err(malformed_error!("Cannot compute the token of an empty public key"));
        }

        let digest: Vec<u8> = match hash_alg {
            AssemblyHashAlgorithm::MD5 => Md5::digest(public_key).to_vec(),
            AssemblyHashAlgorithm::NONE | AssemblyHashAlgorithm::SHA1 => {
                Sha1::digest(public_key).to_vec()
            }
            _ => return Err(Error::NotSupported),
        };

        let mut token = [0u8; 8];
        for (target, source) in token.iter_mut().zip(digest.iter().rev()) {
            *target = *source;
        }

        Ok(PublicKeyToken(token))
    }
}

impl fmt::Display for PublicKeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for PublicKeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKeyToken({self})")
    }
}

/// The identity of an assembly: name, version, culture and public key token.
///
/// Equality and hashing compare the name case-insensitively together with the version and the
/// public key token. The culture is carried for display only.
#[derive(Clone, Debug)]
pub struct AssemblyIdentity {
    /// Simple name, e.g. `System.Runtime`
    pub name: String,
    /// Four-part version
    pub version: AssemblyVersion,
    /// Culture, `None` for culture-neutral assemblies
    pub culture: Option<String>,
    /// Token of the signing key, `None` for unsigned assemblies
    pub public_key_token: Option<PublicKeyToken>,
}

impl AssemblyIdentity {
    /// A culture-neutral, unsigned identity.
    #[must_use]
    pub fn new(name: impl Into<String>, version: AssemblyVersion) -> Self {
        AssemblyIdentity {
            name: name.into(),
            version,
            culture: None,
            public_key_token: None,
        }
    }

    /// Set the culture; an empty string or `neutral` means culture-neutral.
    #[must_use]
    pub fn with_culture(mut self, culture: impl Into<String>) -> Self {
        self.culture = normalize_culture(culture.into());
        self
    }

    /// Set the public key token.
    #[must_use]
    pub fn with_public_key_token(mut self, token: PublicKeyToken) -> Self {
        self.public_key_token = Some(token);
        self
    }

    /// Whether this names one of the core library assemblies.
    #[must_use]
    pub fn is_core_library(&self) -> bool {
        is_core_library_name(&self.name)
    }

    /// Identity of the `Assembly` row of a module.
    ///
    /// `public_key` is the resolved blob of the row; the token is computed from it.
    ///
    /// # Errors
    /// Returns an error if the token cannot be computed.
    pub fn from_assembly(
        row: &AssemblyRaw,
        name: &str,
        culture: &str,
        public_key: &[u8],
    ) -> Result<Self> {
        let public_key_token = if public_key.is_empty() {
            None
        } else {
            Some(PublicKeyToken::from_public_key(public_key, row.hash_alg_id)?)
        };

        Ok(AssemblyIdentity {
            name: name.to_string(),
            version: AssemblyVersion::new(
                row.major_version,
                row.minor_version,
                row.build_number,
                row.revision_number,
            ),
            culture: normalize_culture(culture.to_string()),
            public_key_token,
        })
    }

    /// Identity named by an `AssemblyRef` row.
    ///
    /// `key_or_token` is the resolved blob of the row; the `PublicKey` flag says whether it is a
    /// full key (hashed with SHA-1) or already a token.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a token blob that is not 8 bytes long.
    pub fn from_assembly_ref(
        row: &AssemblyRefRaw,
        name: &str,
        culture: &str,
        key_or_token: &[u8],
    ) -> Result<Self> {
        let flags = AssemblyFlags::from_bits_truncate(row.flags);
        let public_key_token = if key_or_token.is_empty() {
            None
        } else if flags.contains(AssemblyFlags::PUBLIC_KEY) {
            Some(PublicKeyToken::from_public_key(
                key_or_token,
                AssemblyHashAlgorithm::SHA1,
            )?)
        } else {
            Some(PublicKeyToken::from_bytes(key_or_token)?)
        };

        Ok(AssemblyIdentity {
            name: name.to_string(),
            version: AssemblyVersion::new(
                row.major_version,
                row.minor_version,
                row.build_number,
                row.revision_number,
            ),
            culture: normalize_culture(culture.to_string()),
            public_key_token,
        })
    }
}

fn normalize_culture(culture: String) -> Option<String> {
    if culture.is_empty() || culture.eq_ignore_ascii_case("neutral") {
        None
    } else {
        Some(culture)
    }
}

impl PartialEq for AssemblyIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.version == other.version
            && self.public_key_token == other.public_key_token
    }
}

impl Eq for AssemblyIdentity {}

impl Hash for AssemblyIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.name.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
        self.version.hash(state);
        self.public_key_token.hash(state);
    }
}

impl fmt::Display for AssemblyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, Version={}, Culture={}, PublicKeyToken=",
            self.name,
            self.version,
            self.culture.as_deref().unwrap_or("neutral")
        )?;
        match &self.public_key_token {
            Some(token) => write!(f, "{token}"),
            None => write!(f, "null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::metadata::token::Token;

    const ECMA_KEY: [u8; 16] = [0, 0, 0, 0, 0, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0];
    const ECMA_TOKEN: [u8; 8] = [0xb7, 0x7a, 0x5c, 0x56, 0x19, 0x34, 0xe0, 0x89];

    fn assembly_ref_row(flags: u32) -> AssemblyRefRaw {
        AssemblyRefRaw {
            rid: 1,
            token: Token::new(0x2300_0001),
            offset: 0,
            major_version: 4,
            minor_version: 0,
            build_number: 0,
            revision_number: 0,
            flags,
            public_key_or_token: 0,
            name: 0,
            culture: 0,
            hash_value: 0,
        }
    }

    #[test]
    fn ecma_key_token() {
        let token = PublicKeyToken::from_public_key(&ECMA_KEY, AssemblyHashAlgorithm::SHA1).unwrap();
        assert_eq!(token, PublicKeyToken(ECMA_TOKEN));
        assert_eq!(token.to_string(), "b77a5c561934e089");
    }

    #[test]
    fn md5_token() {
        let token = PublicKeyToken::from_public_key(&ECMA_KEY, AssemblyHashAlgorithm::MD5).unwrap();
        let digest = Md5::digest(ECMA_KEY);
        assert_eq!(token.0[0], digest[15]);
        assert_eq!(token.0[7], digest[8]);

        assert!(matches!(
            PublicKeyToken::from_public_key(&ECMA_KEY, 0x800C),
            Err(Error::NotSupported)
        ));
        assert!(PublicKeyToken::from_public_key(&[], AssemblyHashAlgorithm::SHA1).is_err());
    }

    #[test]
    fn reference_forms_agree() {
        let from_token =
            AssemblyIdentity::from_assembly_ref(&assembly_ref_row(0), "MSCORLIB", "", &ECMA_TOKEN)
                .unwrap();
        let from_key = AssemblyIdentity::from_assembly_ref(
            &assembly_ref_row(AssemblyFlags::PUBLIC_KEY.bits()),
            "mscorlib",
            "neutral",
            &ECMA_KEY,
        )
        .unwrap();

        assert_eq!(from_token, from_key);
        assert!(from_key.culture.is_none());

        let mut set = HashSet::new();
        set.insert(from_token);
        assert!(set.contains(&from_key));

        assert!(
            AssemblyIdentity::from_assembly_ref(&assembly_ref_row(0), "x", "", &[1, 2, 3]).is_err()
        );
    }

    #[test]
    fn equality_ignores_culture() {
        let neutral = AssemblyIdentity::new("Library", AssemblyVersion::new(1, 2, 3, 4));
        let german = neutral.clone().with_culture("de-DE");
        let newer = AssemblyIdentity::new("library", AssemblyVersion::new(1, 2, 3, 5));

        assert_eq!(neutral, german);
        assert_ne!(neutral, newer);
        assert_ne!(neutral, neutral.clone().with_public_key_token(PublicKeyToken(ECMA_TOKEN)));
    }

    #[test]
    fn display() {
        let identity = AssemblyIdentity::new("System.Runtime", AssemblyVersion::new(8, 0, 0, 0))
            .with_public_key_token(PublicKeyToken(ECMA_TOKEN));
        assert_eq!(
            identity.to_string(),
            "System.Runtime, Version=8.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089"
        );
        assert!(identity.is_core_library());
        assert!(!AssemblyIdentity::new("System.Core", AssemblyVersion::default()).is_core_library());
    }
}
