//! Plate ownership circuit.
//!
//! Proves knowledge of the 8 encoded plate elements and the salt behind a
//! public Poseidon commitment, without revealing either. The circuit has
//! exactly one public input: the commitment itself.

pub mod gadgets;

use halo2_base::{
    gates::{
        circuit::builder::BaseCircuitBuilder,
        circuit::{BaseCircuitParams, BaseConfig, CircuitBuilderStage},
        flex_gate::GateChip,
    },
    AssignedValue,
};
use halo2_proofs_axiom::{
    circuit::{Layouter, SimpleFloorPlanner},
    plonk::{Circuit, ConstraintSystem, Error},
};
use halo2curves_axiom::{bn256::Fr, ff::Field};

/// Number of encoded plate elements committed to (salt excluded).
pub const PLATE_ELEMENT_COUNT: usize = 8;

const DEFAULT_K: usize = 12;
const NUM_INSTANCE_COLUMNS: usize = 1;
const DEFAULT_ADVICE_PER_PHASE: usize = 4;
const DEFAULT_FIXED_COLUMNS: usize = 1;

fn default_params() -> BaseCircuitParams {
    BaseCircuitParams {
        k: DEFAULT_K,
        num_advice_per_phase: vec![DEFAULT_ADVICE_PER_PHASE],
        num_fixed: DEFAULT_FIXED_COLUMNS,
        num_lookup_advice_per_phase: vec![0],
        lookup_bits: None,
        num_instance_columns: NUM_INSTANCE_COLUMNS,
    }
}

/// Public side of the ownership relation: the commitment alone.
#[derive(Clone, Copy, Debug)]
pub struct PublicInputs {
    pub commitment: Fr,
}

/// Private witness: the encoded plate elements and the blinding salt.
///
/// Never serialized, `Debug`-redacted, and wiped on drop so no preimage
/// residue outlives the proving call that consumed it.
#[derive(Clone)]
pub struct OwnershipWitness {
    pub elements: [Fr; PLATE_ELEMENT_COUNT],
    pub salt: Fr,
}

impl std::fmt::Debug for OwnershipWitness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OwnershipWitness(<redacted>)")
    }
}

impl Drop for OwnershipWitness {
    fn drop(&mut self) {
        self.elements = [Fr::ZERO; PLATE_ELEMENT_COUNT];
        self.salt = Fr::ZERO;
    }
}

#[derive(Clone, Debug)]
pub struct PlateCircuitInput {
    pub witness: OwnershipWitness,
    pub public: PublicInputs,
}

#[derive(Clone, Debug)]
pub struct PlateOwnershipCircuit {
    pub input: Option<PlateCircuitInput>,
    params: BaseCircuitParams,
}

impl Default for PlateOwnershipCircuit {
    fn default() -> Self {
        Self {
            input: None,
            params: default_params(),
        }
    }
}

impl PlateOwnershipCircuit {
    pub fn new(input: Option<PlateCircuitInput>) -> Self {
        Self {
            input,
            params: default_params(),
        }
    }
}

/// Instance columns for the verifier: a single column holding the commitment.
pub fn public_instances(public: &PublicInputs) -> Vec<Vec<Fr>> {
    vec![vec![public.commitment]]
}

impl Circuit<Fr> for PlateOwnershipCircuit {
    type Config = BaseConfig<Fr>;
    type FloorPlanner = SimpleFloorPlanner;
    type Params = BaseCircuitParams;

    fn params(&self) -> Self::Params {
        self.params.clone()
    }

    fn without_witnesses(&self) -> Self {
        Self {
            input: None,
            params: self.params.clone(),
        }
    }

    fn configure_with_params(
        meta: &mut ConstraintSystem<Fr>,
        params: Self::Params,
    ) -> Self::Config {
        BaseConfig::configure(meta, params)
    }

    fn configure(_: &mut ConstraintSystem<Fr>) -> Self::Config {
        unreachable!("PlateOwnershipCircuit must be configured with explicit parameters")
    }

    fn synthesize(&self, config: Self::Config, layouter: impl Layouter<Fr>) -> Result<(), Error> {
        let stage = if self.input.is_some() {
            CircuitBuilderStage::Mock
        } else {
            CircuitBuilderStage::Keygen
        };

        // Keygen does not look at witness values; an all-zero preimage is
        // enough to fix the constraint structure.
        let keygen_input = keygen_input();
        let input = self.input.as_ref().unwrap_or(&keygen_input);

        let mut builder = BaseCircuitBuilder::<Fr>::from_stage(stage)
            .use_params(self.params.clone())
            .use_instance_columns(self.params.num_instance_columns);

        build_constraints(&mut builder, input);
        <BaseCircuitBuilder<Fr> as Circuit<Fr>>::synthesize(&builder, config, layouter)
    }
}

fn keygen_input() -> PlateCircuitInput {
    PlateCircuitInput {
        witness: OwnershipWitness {
            elements: [Fr::ZERO; PLATE_ELEMENT_COUNT],
            salt: Fr::ZERO,
        },
        public: PublicInputs {
            commitment: Fr::ZERO,
        },
    }
}

fn build_constraints(builder: &mut BaseCircuitBuilder<Fr>, input: &PlateCircuitInput) {
    let gate = GateChip::<Fr>::default();
    let ctx = builder.main(0);

    let elements: Vec<AssignedValue<Fr>> = input
        .witness
        .elements
        .iter()
        .map(|element| ctx.load_witness(*element))
        .collect();
    let salt = ctx.load_witness(input.witness.salt);

    // Commitment relation: one Poseidon absorption over all 9 preimage cells.
    let derived = gadgets::poseidon::hash_plate_preimage(ctx, &gate, &elements, salt);

    // Ownership relation: the derived commitment must equal the public one.
    // No satisfying witness exists otherwise.
    let claimed = ctx.load_witness(input.public.commitment);
    ctx.constrain_equal(&derived, &claimed);

    builder.assigned_instances[0].push(claimed);
}
