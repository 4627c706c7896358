//! Proof verification against the public commitment.
//!
//! The KZG pairing check runs in constant time with respect to circuit
//! size. A corrupted or truncated proof yields `false`; malformed input
//! from an untrusted prover is an expected case, never a panic.

use anyhow::{ensure, Result};
use halo2_proofs_axiom::{
    plonk::verify_proof,
    poly::kzg::{
        commitment::{KZGCommitmentScheme, ParamsKZG},
        multiopen::VerifierGWC,
        strategy::SingleStrategy,
    },
    transcript::{Blake2bRead, Challenge255, TranscriptReadBuffer},
};
use halo2curves_axiom::bn256::{Bn256, Fr, G1Affine};
use zkpa_common::{public_inputs_to_instances, Commitment, ProofBundle, VerifierArtifacts};

/// Raw pairing-equation check of a proof against instance columns.
pub fn verify(
    params: &ParamsKZG<Bn256>,
    vk: &halo2_proofs_axiom::plonk::VerifyingKey<G1Affine>,
    proof_bytes: &[u8],
    instances: &[Vec<Fr>],
) -> bool {
    let mut transcript = Blake2bRead::<_, G1Affine, Challenge255<_>>::init(proof_bytes);

    let instance_columns: Vec<&[Fr]> = instances.iter().map(|col| col.as_slice()).collect();
    let prepared_instances = vec![instance_columns.as_slice()];

    verify_proof::<KZGCommitmentScheme<Bn256>, VerifierGWC<'_, Bn256>, _, _, _>(
        params,
        vk,
        SingleStrategy::new(params),
        &prepared_instances,
        &mut transcript,
    )
    .is_ok()
}

/// Verify a proof against an expected commitment supplied by the caller.
///
/// The instance vector is rebuilt from `commitment`, so a bundle claiming a
/// different public input cannot pass against it.
pub fn verify_commitment(
    artifacts: &VerifierArtifacts,
    proof_bytes: &[u8],
    commitment: Commitment,
) -> bool {
    let instances = vec![vec![*commitment.as_fr()]];
    let valid = verify(&artifacts.params, &artifacts.vk, proof_bytes, &instances);
    tracing::debug!(commitment = %commitment, valid, "ownership proof checked");
    valid
}

/// Verify a self-describing bundle.
///
/// Version and public-input decoding problems are input errors, distinct
/// from a definite `false` verdict on the proof itself.
pub fn verify_bundle(artifacts: &VerifierArtifacts, bundle: &ProofBundle) -> Result<bool> {
    ensure!(
        bundle.circuit_version == artifacts.manifest.circuit_version,
        "circuit version mismatch: bundle {} vs artifacts {}",
        bundle.circuit_version,
        artifacts.manifest.circuit_version
    );
    let instances = public_inputs_to_instances(&bundle.public_inputs)?;
    let valid = verify(&artifacts.params, &artifacts.vk, &bundle.proof, &instances);
    let commitment_hex = format!("0x{}", hex::encode(bundle.public_inputs.commitment));
    tracing::debug!(commitment = %commitment_hex, valid, "proof bundle verified");
    Ok(valid)
}
