//! Off-chain witness computation and proof production.
//!
//! Proving is stateless: each call owns its witness, and the witness is
//! wiped when the proving call returns. A hard deadline bounds proof
//! production; exceeding it is a retryable failure, ideally retried with a
//! fresh salt.

use std::{
    path::Path,
    time::{Duration, Instant},
};

use halo2_proofs_axiom::{
    plonk::{self, create_proof, keygen_pk, keygen_vk},
    poly::kzg::{
        commitment::{KZGCommitmentScheme, ParamsKZG},
        multiopen::ProverGWC,
    },
    transcript::{Blake2bWrite, Challenge255, TranscriptWriterBuffer},
};
use halo2curves_axiom::bn256::{Bn256, Fr, G1Affine};
use rand::rngs::OsRng;
use thiserror::Error;
use zkpa_circuit::{
    OwnershipWitness, PlateCircuitInput, PlateOwnershipCircuit, PublicInputs,
};
use zkpa_common::{
    commit_plate, public_inputs_to_instances, public_to_verifier_inputs, Commitment, ProofBundle,
    ProverArtifacts, VerifierPublicInputs,
};
use zkpa_encoder::EncodedPlate;

/// Default wall-clock budget for one proving call.
pub const PROVING_DEADLINE: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ProverError {
    /// Proof production exceeded its wall-clock budget. Retryable.
    #[error("proof generation took {elapsed:?}, exceeding the {limit:?} deadline")]
    Timeout { limit: Duration, elapsed: Duration },
    /// Witness assignment or constraint synthesis failed.
    #[error("witness generation failed: {0}")]
    WitnessGeneration(String),
    /// Precompiled proving artifacts could not be loaded.
    #[error("failed to load proving artifacts: {0}")]
    KeyLoad(String),
}

pub struct ProverParams {
    pub params: ParamsKZG<Bn256>,
    pub vk: plonk::VerifyingKey<G1Affine>,
    pub pk: plonk::ProvingKey<G1Affine>,
}

/// One-time key generation for the ownership circuit.
pub fn setup(k: u32) -> ProverParams {
    let mut rng = OsRng;
    let params = ParamsKZG::<Bn256>::setup(k, &mut rng);
    let empty_circuit = PlateOwnershipCircuit::default();
    let vk = keygen_vk(&params, &empty_circuit).expect("vk");
    let pk = keygen_pk(&params, vk.clone(), &empty_circuit).expect("pk");
    ProverParams { params, vk, pk }
}

/// Load precompiled proving artifacts from a manifest on disk.
pub fn load_artifacts(manifest_path: impl AsRef<Path>) -> Result<ProverArtifacts, ProverError> {
    zkpa_common::load_prover_artifacts(manifest_path)
        .map_err(|err| ProverError::KeyLoad(format!("{err:#}")))
}

/// Prove ownership of an encoded plate: commit, build the witness, produce
/// the bundle. The encoded elements and salt are consumed and wiped here;
/// nothing private outlives the call.
pub fn prove_plate(
    artifacts: &ProverArtifacts,
    encoded: EncodedPlate,
) -> Result<(Commitment, ProofBundle), ProverError> {
    let commitment = commit_plate(&encoded.elements, encoded.salt);
    let input = PlateCircuitInput {
        witness: OwnershipWitness {
            elements: encoded.elements,
            salt: encoded.salt,
        },
        public: PublicInputs {
            commitment: *commitment.as_fr(),
        },
    };
    let bundle = prove_bundle(&artifacts.params, &artifacts.pk, input)?;
    Ok((commitment, bundle))
}

pub fn prove(
    params: &ParamsKZG<Bn256>,
    pk: &plonk::ProvingKey<G1Affine>,
    input: PlateCircuitInput,
) -> Result<Vec<u8>, ProverError> {
    Ok(prove_with_public_inputs(params, pk, input)?.0)
}

pub fn prove_with_public_inputs(
    params: &ParamsKZG<Bn256>,
    pk: &plonk::ProvingKey<G1Affine>,
    input: PlateCircuitInput,
) -> Result<(Vec<u8>, VerifierPublicInputs), ProverError> {
    let public_inputs = public_to_verifier_inputs(&input.public);
    let proof = create_proof_bytes(params, pk, input)?;
    Ok((proof, public_inputs))
}

pub fn prove_bundle(
    params: &ParamsKZG<Bn256>,
    pk: &plonk::ProvingKey<G1Affine>,
    input: PlateCircuitInput,
) -> Result<ProofBundle, ProverError> {
    prove_bundle_with_deadline(params, pk, input, PROVING_DEADLINE)
}

pub fn prove_bundle_with_deadline(
    params: &ParamsKZG<Bn256>,
    pk: &plonk::ProvingKey<G1Affine>,
    input: PlateCircuitInput,
    deadline: Duration,
) -> Result<ProofBundle, ProverError> {
    let started = Instant::now();
    let (proof, public_inputs) = prove_with_public_inputs(params, pk, input)?;
    let elapsed = started.elapsed();
    tracing::debug!(?elapsed, proof_len = proof.len(), "ownership proof produced");

    // The budget is checked after the proving call returns; a stuck run
    // surfaces as Timeout instead of a silently late success.
    if elapsed > deadline {
        return Err(ProverError::Timeout {
            limit: deadline,
            elapsed,
        });
    }
    Ok(ProofBundle::new(proof, public_inputs))
}

/// Pre-screen a bundle with the prover's own keys before paying any
/// on-ledger verification cost.
pub fn verify_locally(artifacts: &ProverArtifacts, bundle: &ProofBundle) -> bool {
    match public_inputs_to_instances(&bundle.public_inputs) {
        Ok(instances) => {
            zkpa_verifier::verify(&artifacts.params, &artifacts.vk, &bundle.proof, &instances)
        }
        Err(_) => false,
    }
}

fn create_proof_bytes(
    params: &ParamsKZG<Bn256>,
    pk: &plonk::ProvingKey<G1Affine>,
    input: PlateCircuitInput,
) -> Result<Vec<u8>, ProverError> {
    let instance_slices = zkpa_circuit::public_instances(&input.public);
    let instance_refs: Vec<&[Fr]> = instance_slices.iter().map(|col| col.as_slice()).collect();

    // The circuit takes ownership of the witness; dropping it at the end of
    // this call wipes the preimage.
    let circuit = PlateOwnershipCircuit::new(Some(input));

    let mut transcript = Blake2bWrite::<_, G1Affine, Challenge255<_>>::init(vec![]);
    create_proof::<KZGCommitmentScheme<Bn256>, ProverGWC<'_, Bn256>, _, _, _, _>(
        params,
        pk,
        &[circuit],
        &[instance_refs.as_slice()],
        OsRng,
        &mut transcript,
    )
    .map_err(|err| ProverError::WitnessGeneration(err.to_string()))?;
    Ok(transcript.finalize())
}
