//! Credentials: the signatures that authorize one input or operation.

use serde::{Deserialize, Serialize};

use crate::codec::{Decode, Encode, Reader, Writer};
use crate::constants::{NFT_CREDENTIAL_ID, SECP_CREDENTIAL_ID, SIGNATURE_LEN};
use crate::crypto::Signature;
use crate::error::CodecError;

/// Fx a credential belongs to. The layouts are identical; only the tag
/// differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialKind {
    Secp,
    Nft,
}

impl CredentialKind {
    pub fn credential_id(self) -> u32 {
        match self {
            Self::Secp => SECP_CREDENTIAL_ID,
            Self::Nft => NFT_CREDENTIAL_ID,
        }
    }

    pub fn from_id(id: u32) -> Result<Self, CodecError> {
        match id {
            SECP_CREDENTIAL_ID => Ok(Self::Secp),
            NFT_CREDENTIAL_ID => Ok(Self::Nft),
            tag => Err(CodecError::UnknownTypeTag {
                kind: "credential",
                tag,
            }),
        }
    }
}

/// Signatures in the same order as the `SigIdx` list they answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Credential {
    pub kind: CredentialKind,
    pub signatures: Vec<Signature>,
}

impl Credential {
    pub fn new(kind: CredentialKind) -> Self {
        Self {
            kind,
            signatures: Vec::new(),
        }
    }

    pub fn credential_id(&self) -> u32 {
        self.kind.credential_id()
    }

    pub fn push(&mut self, signature: Signature) {
        self.signatures.push(signature);
    }
}

/// `u32 credentialID ‖ u32 n ‖ n × 65-byte signature`.
impl Encode for Credential {
    fn encode_into(&self, w: &mut Writer) {
        w.put_u32(self.credential_id());
        w.put_list(&self.signatures);
    }
}

impl Decode for Credential {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let kind = CredentialKind::from_id(r.get_u32()?)?;
        let signatures = r.get_list(SIGNATURE_LEN)?;
        Ok(Self { kind, signatures })
    }
}
