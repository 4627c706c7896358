//! Shared types for the plate-account proof pipeline: the public
//! commitment, proof bundles, precompiled proving artifacts, and BN254
//! scalar helpers.

pub mod poseidon;

use std::{
    fmt,
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, ensure, Context, Result};
use halo2_proofs_axiom::{
    plonk::{self, Circuit},
    poly::{commitment::Params, kzg::commitment::ParamsKZG},
    SerdeFormat,
};
use halo2curves_axiom::{
    bn256::{Bn256, Fr, G1Affine},
    ff::{Field, PrimeField},
};
use serde::{Deserialize, Serialize};
use zkpa_circuit::{PlateOwnershipCircuit, PublicInputs, PLATE_ELEMENT_COUNT};

pub use poseidon::poseidon_hash;

/// Number of public inputs to the ownership circuit: the commitment alone.
pub const PUBLIC_INPUT_COUNT: usize = 1;

pub const CIRCUIT_VERSION: u32 = 1;
pub const MANIFEST_VERSION: u32 = 1;
pub const MANIFEST_FILE: &str = "manifest.json";

/// Public Poseidon commitment to an encoded plate.
///
/// Hiding (the salt blinds the preimage) and binding (Poseidon collision
/// resistance). The only value about a plate that ever leaves the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment(#[serde(with = "serde_fr_hex")] Fr);

impl Commitment {
    pub fn from_fr(fr: Fr) -> Self {
        Self(fr)
    }

    pub fn as_fr(&self) -> &Fr {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        fr_to_bytes(&self.0)
    }

    /// Strict decoding: rejects non-canonical scalar encodings.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        Ok(Self(fr_from_bytes(bytes)?))
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_bytes()))
    }
}

/// Commit to the 8 encoded plate elements under a blinding salt.
///
/// Must stay bit-exact with the in-circuit relation; both sides absorb the
/// same 9 field elements through the same Poseidon spec.
pub fn commit_plate(elements: &[Fr; PLATE_ELEMENT_COUNT], salt: Fr) -> Commitment {
    let mut preimage = [Fr::ZERO; PLATE_ELEMENT_COUNT + 1];
    preimage[..PLATE_ELEMENT_COUNT].copy_from_slice(elements);
    preimage[PLATE_ELEMENT_COUNT] = salt;
    Commitment(poseidon_hash(&preimage))
}

/// Verifier-facing public inputs. Exactly one value crosses the trust
/// boundary: the commitment, as canonical scalar bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierPublicInputs {
    pub commitment: [u8; 32],
}

impl VerifierPublicInputs {
    pub fn from_commitment(commitment: Commitment) -> Self {
        Self {
            commitment: commitment.to_bytes(),
        }
    }

    pub fn commitment(&self) -> Result<Commitment> {
        Commitment::from_bytes(&self.commitment)
    }
}

pub fn verifier_inputs_to_public(inputs: &VerifierPublicInputs) -> Result<PublicInputs> {
    Ok(PublicInputs {
        commitment: fr_from_bytes(&inputs.commitment)?,
    })
}

pub fn public_to_verifier_inputs(public: &PublicInputs) -> VerifierPublicInputs {
    VerifierPublicInputs {
        commitment: fr_to_bytes(&public.commitment),
    }
}

pub fn public_inputs_to_instances(inputs: &VerifierPublicInputs) -> Result<Vec<Vec<Fr>>> {
    let public = verifier_inputs_to_public(inputs)?;
    Ok(zkpa_circuit::public_instances(&public))
}

pub fn instances_to_verifier_inputs(instances: &[Vec<Fr>]) -> Result<VerifierPublicInputs> {
    ensure!(
        instances.len() == PUBLIC_INPUT_COUNT,
        "expected {} instance columns, got {}",
        PUBLIC_INPUT_COUNT,
        instances.len()
    );
    ensure!(
        instances[0].len() == 1,
        "expected a single commitment instance, got {}",
        instances[0].len()
    );
    Ok(VerifierPublicInputs {
        commitment: fr_to_bytes(&instances[0][0]),
    })
}

/// A proof plus the public inputs it binds to. Ephemeral: consumed by
/// verification, never persisted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProofBundle {
    pub circuit_version: u32,
    pub proof: Vec<u8>,
    pub public_inputs: VerifierPublicInputs,
}

impl ProofBundle {
    pub fn new(proof: Vec<u8>, public_inputs: VerifierPublicInputs) -> Self {
        Self {
            circuit_version: CIRCUIT_VERSION,
            proof,
            public_inputs,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub path: String,
    pub blake3: String,
    pub size: u64,
}

impl ArtifactFile {
    pub fn from_bytes(path: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            path: path.into(),
            blake3: hash_bytes_hex(bytes),
            size: bytes.len() as u64,
        }
    }

    fn resolve_path(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.path)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub manifest_version: u32,
    pub circuit_version: u32,
    pub k: u32,
    pub created_at_unix: u64,
    pub params: ArtifactFile,
    pub vk: ArtifactFile,
    pub pk: ArtifactFile,
}

#[derive(Clone, Debug)]
pub struct VerifierArtifacts {
    pub manifest: ArtifactManifest,
    pub params_bytes: Vec<u8>,
    pub vk_bytes: Vec<u8>,
    pub params: ParamsKZG<Bn256>,
    pub vk: plonk::VerifyingKey<G1Affine>,
}

#[derive(Clone, Debug)]
pub struct ProverArtifacts {
    pub manifest: ArtifactManifest,
    pub params_bytes: Vec<u8>,
    pub vk_bytes: Vec<u8>,
    pub pk_bytes: Vec<u8>,
    pub params: ParamsKZG<Bn256>,
    pub vk: plonk::VerifyingKey<G1Affine>,
    pub pk: plonk::ProvingKey<G1Affine>,
}

impl ProverArtifacts {
    /// Drop the proving key, keeping only what verification needs.
    pub fn to_verifier(&self) -> VerifierArtifacts {
        VerifierArtifacts {
            manifest: self.manifest.clone(),
            params_bytes: self.params_bytes.clone(),
            vk_bytes: self.vk_bytes.clone(),
            params: self.params.clone(),
            vk: self.vk.clone(),
        }
    }
}

pub fn serialize_params(params: &ParamsKZG<Bn256>) -> Result<Vec<u8>> {
    let mut buf = vec![];
    params
        .write(&mut buf)
        .context("failed to serialize KZG params")?;
    Ok(buf)
}

pub fn deserialize_params(bytes: &[u8]) -> Result<ParamsKZG<Bn256>> {
    let mut reader = Cursor::new(bytes);
    ParamsKZG::<Bn256>::read(&mut reader).context("failed to deserialize KZG params")
}

pub fn serialize_verifying_key(vk: &plonk::VerifyingKey<G1Affine>) -> Result<Vec<u8>> {
    let mut buf = vec![];
    vk.write(&mut buf, SerdeFormat::Processed)
        .context("failed to serialize verifying key")?;
    Ok(buf)
}

pub fn deserialize_verifying_key(bytes: &[u8]) -> Result<plonk::VerifyingKey<G1Affine>> {
    let params = PlateOwnershipCircuit::default().params();
    let mut reader = Cursor::new(bytes);
    plonk::VerifyingKey::read::<_, PlateOwnershipCircuit>(&mut reader, SerdeFormat::Processed, params)
        .context("failed to deserialize verifying key")
}

pub fn serialize_proving_key(pk: &plonk::ProvingKey<G1Affine>) -> Result<Vec<u8>> {
    let mut buf = vec![];
    pk.write(&mut buf, SerdeFormat::Processed)
        .context("failed to serialize proving key")?;
    Ok(buf)
}

pub fn deserialize_proving_key(bytes: &[u8]) -> Result<plonk::ProvingKey<G1Affine>> {
    let params = PlateOwnershipCircuit::default().params();
    let mut reader = Cursor::new(bytes);
    plonk::ProvingKey::read::<_, PlateOwnershipCircuit>(&mut reader, SerdeFormat::Processed, params)
        .context("failed to deserialize proving key")
}

pub fn write_manifest(path: impl AsRef<Path>, manifest: &ArtifactManifest) -> Result<()> {
    let json = serde_json::to_vec_pretty(manifest).context("failed to serialize manifest")?;
    fs::write(path.as_ref(), json).context("failed to write manifest")
}

pub fn read_manifest(path: impl AsRef<Path>) -> Result<ArtifactManifest> {
    let bytes = fs::read(path.as_ref()).context("failed to read manifest file")?;
    serde_json::from_slice(&bytes).context("failed to parse manifest json")
}

pub fn load_verifier_artifacts(path: impl AsRef<Path>) -> Result<VerifierArtifacts> {
    let (manifest, params_bytes, vk_bytes, _) = load_artifact_bytes(path.as_ref(), false)?;

    let params = deserialize_params(&params_bytes)?;
    let vk = deserialize_verifying_key(&vk_bytes)?;

    Ok(VerifierArtifacts {
        manifest,
        params_bytes,
        vk_bytes,
        params,
        vk,
    })
}

pub fn load_prover_artifacts(path: impl AsRef<Path>) -> Result<ProverArtifacts> {
    let (manifest, params_bytes, vk_bytes, pk_bytes) = load_artifact_bytes(path.as_ref(), true)?;
    let pk_bytes = pk_bytes.ok_or_else(|| anyhow!("manifest has no proving key entry"))?;

    let params = deserialize_params(&params_bytes)?;
    let vk = deserialize_verifying_key(&vk_bytes)?;
    let pk = deserialize_proving_key(&pk_bytes)?;

    Ok(ProverArtifacts {
        manifest,
        params_bytes,
        vk_bytes,
        pk_bytes,
        params,
        vk,
        pk,
    })
}

fn load_artifact_bytes(
    manifest_path: &Path,
    with_pk: bool,
) -> Result<(ArtifactManifest, Vec<u8>, Vec<u8>, Option<Vec<u8>>)> {
    let manifest = read_manifest(manifest_path)?;
    ensure!(
        manifest.manifest_version == MANIFEST_VERSION,
        "unsupported manifest version {}",
        manifest.manifest_version
    );

    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));

    let params_bytes = read_artifact(&manifest.params, base_dir, "params")?;
    let vk_bytes = read_artifact(&manifest.vk, base_dir, "vk")?;
    let pk_bytes = if with_pk {
        Some(read_artifact(&manifest.pk, base_dir, "pk")?)
    } else {
        None
    };

    Ok((manifest, params_bytes, vk_bytes, pk_bytes))
}

fn read_artifact(file: &ArtifactFile, base_dir: &Path, label: &str) -> Result<Vec<u8>> {
    let path = file.resolve_path(base_dir);
    let bytes =
        fs::read(&path).with_context(|| format!("failed to read {} from {}", label, path.display()))?;
    ensure!(
        hash_bytes_hex(&bytes) == file.blake3,
        "{} content hash mismatch for {}",
        label,
        path.display()
    );
    Ok(bytes)
}

pub fn hash_bytes_hex(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Strict canonical decoding of a BN254 scalar (little-endian repr).
pub fn fr_from_bytes(bytes: &[u8; 32]) -> Result<Fr> {
    Fr::from_repr(*bytes)
        .into_option()
        .ok_or_else(|| anyhow!("invalid bn256 scalar encoding"))
}

pub fn fr_to_bytes(fr: &Fr) -> [u8; 32] {
    let repr = fr.to_repr();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(repr.as_ref());
    bytes
}

/// Fold big-endian bytes into a scalar, reducing modulo the field order.
pub fn reduce_be_bytes_to_fr(bytes: &[u8]) -> Fr {
    let mut acc = Fr::ZERO;
    let base = Fr::from(256);
    for byte in bytes.iter() {
        acc = acc * base + Fr::from(*byte as u64);
    }
    acc
}

mod serde_fr_hex {
    use super::*;
    use serde::{de, Deserializer, Serializer};

    pub fn serialize<S>(fr: &Fr, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let hex_str = format!("0x{}", hex::encode(fr_to_bytes(fr)));
        serializer.serialize_str(&hex_str)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fr, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let hex_str = s.strip_prefix("0x").unwrap_or(&s);
        if hex_str.len() != 64 {
            return Err(de::Error::custom(format!(
                "expected 64 hex chars, got {}",
                hex_str.len()
            )));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(hex_str, &mut bytes).map_err(de::Error::custom)?;
        fr_from_bytes(&bytes).map_err(de::Error::custom)
    }
}
