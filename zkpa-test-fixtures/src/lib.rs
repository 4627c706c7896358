//! Shared proving artifacts and sample bundles, built once and reused
//! across the workspace's test suites. Key generation at the circuit's k
//! is the expensive step; everything downstream clones cheaply.

use std::sync::Arc;

use anyhow::{Context, Result};
use halo2curves_axiom::bn256::Fr;
use once_cell::sync::OnceCell;
use zkpa_common::{
    serialize_params, serialize_proving_key, serialize_verifying_key, ArtifactFile,
    ArtifactManifest, Commitment, ProofBundle, ProverArtifacts, VerifierArtifacts,
    CIRCUIT_VERSION, MANIFEST_VERSION,
};
use zkpa_encoder::{encode, PlateIdentifier};
use zkpa_prover::{prove_plate, setup, ProverParams};

const TEST_K: u32 = 12;
const CREATED_AT_UNIX: u64 = 1_700_000_000;
const FIXTURE_SALT: u64 = 0x5A17;

static FIXTURES: OnceCell<TestFixtures> = OnceCell::new();

/// Pre-generated artifacts, a sample commitment, and a valid proof bundle.
pub struct TestFixtures {
    artifacts: Arc<ProverArtifacts>,
    commitment: Commitment,
    bundle: ProofBundle,
}

impl TestFixtures {
    /// Clone the prover artifacts so each test can own an `Arc`.
    pub fn artifacts(&self) -> Arc<ProverArtifacts> {
        Arc::clone(&self.artifacts)
    }

    /// Verifier-side view of the same artifacts.
    pub fn verifier_artifacts(&self) -> Arc<VerifierArtifacts> {
        Arc::new(self.artifacts.to_verifier())
    }

    pub fn commitment(&self) -> Commitment {
        self.commitment
    }

    pub fn bundle(&self) -> &ProofBundle {
        &self.bundle
    }

    pub fn proof(&self) -> &[u8] {
        &self.bundle.proof
    }
}

/// Sample plate reused by every fixture consumer.
pub fn sample_plate() -> PlateIdentifier {
    PlateIdentifier {
        region: "Shinagawa".to_string(),
        class_code: "330".to_string(),
        syllable: "A".to_string(),
        serial: "1234".to_string(),
    }
}

/// Deterministic fixture salt; tests that need fresh salts draw their own.
pub fn fixture_salt() -> Fr {
    Fr::from(FIXTURE_SALT)
}

/// Return lazily constructed fixtures shared across crates.
pub fn fixtures() -> &'static TestFixtures {
    FIXTURES.get_or_init(|| build_fixtures().expect("failed to build zkpa test fixtures"))
}

fn build_fixtures() -> Result<TestFixtures> {
    let ProverParams { params, vk, pk } = setup(TEST_K);

    let params_bytes = serialize_params(&params).context("serialize params")?;
    let vk_bytes = serialize_verifying_key(&vk).context("serialize vk")?;
    let pk_bytes = serialize_proving_key(&pk).context("serialize pk")?;

    let manifest = ArtifactManifest {
        manifest_version: MANIFEST_VERSION,
        circuit_version: CIRCUIT_VERSION,
        k: TEST_K,
        created_at_unix: CREATED_AT_UNIX,
        params: ArtifactFile::from_bytes("params.bin", &params_bytes),
        vk: ArtifactFile::from_bytes("vk.bin", &vk_bytes),
        pk: ArtifactFile::from_bytes("pk.bin", &pk_bytes),
    };

    let artifacts = Arc::new(ProverArtifacts {
        manifest,
        params_bytes,
        vk_bytes,
        pk_bytes,
        params,
        vk,
        pk,
    });

    let encoded = encode(&sample_plate(), Some(fixture_salt()))
        .context("encode fixture plate")?;
    let (commitment, bundle) =
        prove_plate(&artifacts, encoded).context("prove fixture bundle")?;

    Ok(TestFixtures {
        artifacts,
        commitment,
        bundle,
    })
}
