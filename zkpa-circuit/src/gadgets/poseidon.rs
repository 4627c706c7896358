//! In-circuit Poseidon hashing over BN254 scalars.
//!
//! The commitment relation is a single Poseidon absorption of the encoded
//! plate elements followed by the salt. The spec below is the canonical
//! parameter set for the whole workspace; the native hash in `zkpa-common`
//! must stay bit-exact with it.

use halo2_base::{
    gates::flex_gate::GateChip,
    poseidon::hasher::{spec::OptimizedPoseidonSpec, PoseidonHasher},
    AssignedValue, Context,
};
use halo2curves_axiom::bn256::Fr;

pub const POSEIDON_T: usize = 6;
pub const POSEIDON_RATE: usize = 5;
pub const POSEIDON_FULL_ROUNDS: usize = 8;
pub const POSEIDON_PARTIAL_ROUNDS: usize = 57;

/// Hash the 8 plate elements and the salt into one commitment cell.
pub fn hash_plate_preimage(
    ctx: &mut Context<Fr>,
    gate: &GateChip<Fr>,
    elements: &[AssignedValue<Fr>],
    salt: AssignedValue<Fr>,
) -> AssignedValue<Fr> {
    let mut inputs = elements.to_vec();
    inputs.push(salt);
    hash_elements(ctx, gate, &inputs)
}

pub fn hash_elements(
    ctx: &mut Context<Fr>,
    gate: &GateChip<Fr>,
    inputs: &[AssignedValue<Fr>],
) -> AssignedValue<Fr> {
    let mut hasher = PoseidonHasher::<Fr, POSEIDON_T, POSEIDON_RATE>::new(poseidon_spec());
    hasher.initialize_consts(ctx, gate);
    hasher.hash_fix_len_array(ctx, gate, inputs)
}

fn poseidon_spec() -> OptimizedPoseidonSpec<Fr, POSEIDON_T, POSEIDON_RATE> {
    OptimizedPoseidonSpec::new::<POSEIDON_FULL_ROUNDS, POSEIDON_PARTIAL_ROUNDS, 0>()
}
