use halo2_base::poseidon::hasher::spec::OptimizedPoseidonSpec;
use halo2_proofs_axiom::{dev::MockProver, plonk::Circuit};
use halo2curves_axiom::{
    bn256::Fr,
    ff::{Field, PrimeField},
};
use std::sync::OnceLock;
use zkpa_circuit::{
    gadgets::poseidon::{
        POSEIDON_FULL_ROUNDS, POSEIDON_PARTIAL_ROUNDS, POSEIDON_RATE, POSEIDON_T,
    },
    public_instances, OwnershipWitness, PlateCircuitInput, PlateOwnershipCircuit, PublicInputs,
    PLATE_ELEMENT_COUNT,
};

// The native Poseidon below is duplicated from zkpa-common to keep this
// test free of a dev-dependency cycle. Canonical constants come from
// zkpa_circuit::gadgets::poseidon.

const BASE_SALT: u64 = 0x5EED;

#[test]
fn valid_witness_satisfies_circuit() {
    let prover = run_mock_prover(valid_input());
    prover.assert_satisfied();
}

#[test]
fn zero_elements_are_an_ordinary_witness() {
    // Element value 0 is valid, not a sentinel.
    let input = input_from(
        [Fr::ZERO; PLATE_ELEMENT_COUNT],
        Fr::from(BASE_SALT),
    );
    run_mock_prover(input).assert_satisfied();
}

#[test]
fn wrong_commitment_fails() {
    let mut input = valid_input();
    input.public.commitment += Fr::ONE;
    assert!(run_mock_prover(input).verify().is_err());
}

#[test]
fn tampered_element_fails() {
    let mut input = valid_input();
    input.witness.elements[3] += Fr::ONE;
    assert!(run_mock_prover(input).verify().is_err());
}

#[test]
fn tampered_salt_fails() {
    let mut input = valid_input();
    input.witness.salt += Fr::ONE;
    assert!(run_mock_prover(input).verify().is_err());
}

#[test]
fn exactly_one_public_input() {
    let input = valid_input();
    let instances = public_instances(&input.public);
    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].len(), 1);
    assert_eq!(instances[0][0], input.public.commitment);
}

#[test]
fn salt_change_changes_commitment() {
    let elements = sample_elements();
    let c1 = commit(&elements, Fr::from(BASE_SALT));
    let c2 = commit(&elements, Fr::from(BASE_SALT + 1));
    assert_ne!(c1, c2);
}

fn sample_elements() -> [Fr; PLATE_ELEMENT_COUNT] {
    let mut elements = [Fr::ZERO; PLATE_ELEMENT_COUNT];
    for (idx, element) in elements.iter_mut().enumerate() {
        *element = Fr::from((idx as u64 + 1) * 7919);
    }
    elements
}

fn valid_input() -> PlateCircuitInput {
    input_from(sample_elements(), Fr::from(BASE_SALT))
}

fn input_from(elements: [Fr; PLATE_ELEMENT_COUNT], salt: Fr) -> PlateCircuitInput {
    let commitment = commit(&elements, salt);
    PlateCircuitInput {
        witness: OwnershipWitness { elements, salt },
        public: PublicInputs { commitment },
    }
}

fn commit(elements: &[Fr; PLATE_ELEMENT_COUNT], salt: Fr) -> Fr {
    let mut preimage = elements.to_vec();
    preimage.push(salt);
    native_poseidon_hash(&preimage)
}

fn run_mock_prover(input: PlateCircuitInput) -> MockProver<Fr> {
    let instances = public_instances(&input.public);
    let circuit = PlateOwnershipCircuit::new(Some(input));
    let k = circuit.params().k as u32;
    match MockProver::run(k, &circuit, instances) {
        Ok(prover) => prover,
        Err(err) => panic!("mock prover run failed: {:?}", err),
    }
}

fn poseidon_spec() -> &'static OptimizedPoseidonSpec<Fr, POSEIDON_T, POSEIDON_RATE> {
    static SPEC: OnceLock<OptimizedPoseidonSpec<Fr, POSEIDON_T, POSEIDON_RATE>> = OnceLock::new();
    SPEC.get_or_init(|| {
        OptimizedPoseidonSpec::new::<POSEIDON_FULL_ROUNDS, POSEIDON_PARTIAL_ROUNDS, 0>()
    })
}

fn native_poseidon_hash(inputs: &[Fr]) -> Fr {
    let spec = poseidon_spec();
    let mut state = [Fr::ZERO; POSEIDON_T];
    state[0] = Fr::from_u128(1u128 << 64);

    for chunk in inputs.chunks(POSEIDON_RATE) {
        poseidon_permutation(&mut state, chunk, spec);
    }

    if inputs.len() % POSEIDON_RATE == 0 {
        poseidon_permutation(&mut state, &[], spec);
    }

    state[1]
}

fn poseidon_permutation(
    state: &mut [Fr; POSEIDON_T],
    inputs: &[Fr],
    spec: &OptimizedPoseidonSpec<Fr, POSEIDON_T, POSEIDON_RATE>,
) {
    let r_f = spec.r_f() / 2;
    let constants = spec.constants();
    let matrices = spec.mds_matrices();
    let start = constants.start();

    absorb_with_pre_constants(state, inputs, &start[0]);

    for coeffs in start.iter().skip(1).take(r_f - 1) {
        sbox_full(state, coeffs);
        apply_mds(state, matrices.mds().as_ref());
    }

    if let Some(last) = start.last() {
        sbox_full(state, last);
    }
    apply_mds(state, matrices.pre_sparse_mds().as_ref());

    for (constant, sparse) in constants
        .partial()
        .iter()
        .zip(matrices.sparse_matrices().iter())
    {
        sbox_part(state, constant);
        apply_sparse_mds(state, sparse.row(), sparse.col_hat());
    }

    for coeffs in constants.end().iter() {
        sbox_full(state, coeffs);
        apply_mds(state, matrices.mds().as_ref());
    }

    sbox_full(state, &[Fr::ZERO; POSEIDON_T]);
    apply_mds(state, matrices.mds().as_ref());
}

fn absorb_with_pre_constants(
    state: &mut [Fr; POSEIDON_T],
    inputs: &[Fr],
    pre_constants: &[Fr; POSEIDON_T],
) {
    assert!(inputs.len() < POSEIDON_T);

    state[0] += pre_constants[0];
    for (idx, input) in inputs.iter().enumerate() {
        state[idx + 1] += *input + pre_constants[idx + 1];
    }

    let offset = inputs.len() + 1;
    for (i, idx) in (offset..POSEIDON_T).enumerate() {
        let mut addend = pre_constants[idx];
        if i == 0 {
            addend += Fr::ONE;
        }
        state[idx] += addend;
    }
}

fn sbox_full(state: &mut [Fr; POSEIDON_T], constants: &[Fr; POSEIDON_T]) {
    for (value, constant) in state.iter_mut().zip(constants.iter()) {
        *value = value.pow_vartime([5]) + constant;
    }
}

fn sbox_part(state: &mut [Fr; POSEIDON_T], constant: &Fr) {
    state[0] = state[0].pow_vartime([5]) + constant;
}

fn apply_mds(state: &mut [Fr; POSEIDON_T], matrix: &[[Fr; POSEIDON_T]; POSEIDON_T]) {
    let current = *state;
    let mut next = [Fr::ZERO; POSEIDON_T];
    for (i, row) in matrix.iter().enumerate() {
        let mut acc = Fr::ZERO;
        for (coeff, value) in row.iter().zip(current.iter()) {
            acc += *coeff * *value;
        }
        next[i] = acc;
    }
    *state = next;
}

fn apply_sparse_mds(
    state: &mut [Fr; POSEIDON_T],
    row: &[Fr; POSEIDON_T],
    col_hat: &[Fr; POSEIDON_RATE],
) {
    let current = *state;
    let mut next = [Fr::ZERO; POSEIDON_T];

    let mut acc = Fr::ZERO;
    for (coeff, value) in row.iter().zip(current.iter()) {
        acc += *coeff * *value;
    }
    next[0] = acc;

    for (i, (coeff, value)) in col_hat.iter().zip(current.iter().skip(1)).enumerate() {
        next[i + 1] = current[0] * *coeff + *value;
    }

    *state = next;
}
