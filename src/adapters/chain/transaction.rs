//! Sui transaction wire types and plan lowering.
//!
//! BCS layouts mirror the on-chain `TransactionData` enum tree, so
//! variant order in every enum below is load-bearing.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::domain::transaction::{CallInput, TransactionPlan};

pub use crate::domain::move_type::{
    format_address, parse_address, parse_type_tag, StructTag, SuiAddress, TypeTag, ADDRESS_LENGTH,
};

/// Object digest, serialized as a length-prefixed byte vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectDigest(pub Vec<u8>);

impl ObjectDigest {
    pub fn from_base58(s: &str) -> Result<Self> {
        let bytes = bs58::decode(s)
            .into_vec()
            .with_context(|| format!("Invalid object digest {s}"))?;
        if bytes.len() != 32 {
            bail!("Object digest {s} decodes to {} bytes", bytes.len());
        }
        Ok(Self(bytes))
    }
}

pub type ObjectRef = (SuiAddress, u64, ObjectDigest);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TransactionData {
    V1(TransactionDataV1),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionDataV1 {
    pub kind: TransactionKind,
    pub sender: SuiAddress,
    pub gas_data: GasData,
    pub expiration: TransactionExpiration,
}

impl TransactionData {
    pub fn new_programmable(
        sender: SuiAddress,
        payment: Vec<ObjectRef>,
        pt: ProgrammableTransaction,
        budget: u64,
        price: u64,
    ) -> Self {
        Self::V1(TransactionDataV1 {
            kind: TransactionKind::ProgrammableTransaction(pt),
            sender,
            gas_data: GasData {
                payment,
                owner: sender,
                price,
                budget,
            },
            expiration: TransactionExpiration::None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TransactionKind {
    ProgrammableTransaction(ProgrammableTransaction),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgrammableTransaction {
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CallArg {
    Pure(Vec<u8>),
    Object(ObjectArg),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ObjectArg {
    ImmOrOwnedObject(ObjectRef),
    SharedObject {
        id: SuiAddress,
        initial_shared_version: u64,
        mutable: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Command {
    MoveCall(Box<ProgrammableMoveCall>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgrammableMoveCall {
    pub package: SuiAddress,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<TypeTag>,
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Argument {
    GasCoin,
    Input(u16),
    Result(u16),
    NestedResult(u16, u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GasData {
    pub payment: Vec<ObjectRef>,
    pub owner: SuiAddress,
    pub price: u64,
    pub budget: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransactionExpiration {
    None,
}

/// Distinct objects referenced by `plan`, with whether any use is mutable.
///
/// Order is first appearance.
pub fn plan_objects(plan: &TransactionPlan) -> Result<Vec<(SuiAddress, bool)>> {
    let mut out: Vec<(SuiAddress, bool)> = Vec::new();
    for call in &plan.calls {
        for arg in &call.arguments {
            if let CallInput::Object { id, mutable } = arg {
                let addr = parse_address(id)?;
                match out.iter_mut().find(|(a, _)| *a == addr) {
                    Some(entry) => entry.1 |= *mutable,
                    None => out.push((addr, *mutable)),
                }
            }
        }
    }
    Ok(out)
}

/// Lower a plan into a programmable transaction.
///
/// Each object appears once in the inputs; `objects` must hold a
/// resolved argument for every id returned by `plan_objects`.
pub fn lower_plan(
    plan: &TransactionPlan,
    objects: &HashMap<SuiAddress, ObjectArg>,
) -> Result<ProgrammableTransaction> {
    let mut pt = ProgrammableTransaction::default();
    let mut object_inputs: HashMap<SuiAddress, u16> = HashMap::new();

    for call in &plan.calls {
        let mut arguments = Vec::with_capacity(call.arguments.len());
        for arg in &call.arguments {
            let argument = match arg {
                CallInput::Object { id, .. } => {
                    let addr = parse_address(id)?;
                    if let Some(&index) = object_inputs.get(&addr) {
                        Argument::Input(index)
                    } else {
                        let resolved = objects
                            .get(&addr)
                            .with_context(|| format!("Object {id} was not resolved"))?;
                        let index = push_input(&mut pt, CallArg::Object(resolved.clone()))?;
                        object_inputs.insert(addr, index);
                        Argument::Input(index)
                    }
                }
                CallInput::PureU64(v) => push_pure(&mut pt, v)?,
                CallInput::PureU8(v) => push_pure(&mut pt, v)?,
                CallInput::Result(i) => Argument::Result(*i),
            };
            arguments.push(argument);
        }

        pt.commands.push(Command::MoveCall(Box::new(ProgrammableMoveCall {
            package: parse_address(&call.package)?,
            module: call.module.clone(),
            function: call.function.clone(),
            type_arguments: call
                .type_arguments
                .iter()
                .map(|t| parse_type_tag(t))
                .collect::<Result<Vec<_>>>()?,
            arguments,
        })));
    }

    Ok(pt)
}

fn push_input(pt: &mut ProgrammableTransaction, arg: CallArg) -> Result<u16> {
    let index = u16::try_from(pt.inputs.len()).context("Too many transaction inputs")?;
    pt.inputs.push(arg);
    Ok(index)
}

fn push_pure<T: Serialize>(pt: &mut ProgrammableTransaction, value: &T) -> Result<Argument> {
    let bytes = bcs::to_bytes(value).context("Failed to encode pure argument")?;
    Ok(Argument::Input(push_input(pt, CallArg::Pure(bytes))?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::MoveCall;

    fn addr(last: u8) -> SuiAddress {
        let mut a = [0u8; 32];
        a[31] = last;
        a
    }

    #[test]
    fn test_call_arg_bcs_layout() {
        let pure = CallArg::Pure(bcs::to_bytes(&7u64).unwrap());
        assert_eq!(bcs::to_bytes(&pure).unwrap(), vec![0, 8, 7, 0, 0, 0, 0, 0, 0, 0]);

        let shared = CallArg::Object(ObjectArg::SharedObject {
            id: addr(6),
            initial_shared_version: 1,
            mutable: false,
        });
        let mut expected = vec![1, 1];
        expected.extend_from_slice(&addr(6));
        expected.extend_from_slice(&[1, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(bcs::to_bytes(&shared).unwrap(), expected);

        assert_eq!(bcs::to_bytes(&Argument::Result(0)).unwrap(), vec![2, 0, 0]);
    }

    #[test]
    fn test_digest_from_base58() {
        let digest = ObjectDigest::from_base58(&bs58::encode([9u8; 32]).into_string()).unwrap();
        assert_eq!(digest.0, vec![9u8; 32]);
        assert!(ObjectDigest::from_base58("abc").is_err());
    }

    fn two_call_plan() -> TransactionPlan {
        let mut plan = TransactionPlan::default();
        let proof = plan.push(MoveCall {
            package: "0xa".to_string(),
            module: "mm_vault".to_string(),
            function: "generate_trade_proof".to_string(),
            type_arguments: vec!["0x2::sui::SUI".to_string()],
            arguments: vec![CallInput::object("0xc"), CallInput::object("0x7")],
        });
        plan.push(MoveCall {
            package: "0xa".to_string(),
            module: "mm_vault".to_string(),
            function: "create_spread_order".to_string(),
            type_arguments: vec!["0x2::sui::SUI".to_string()],
            arguments: vec![
                CallInput::object("0x07"),
                proof,
                CallInput::PureU64(5),
                CallInput::immutable("0x6"),
            ],
        });
        plan
    }

    #[test]
    fn test_plan_objects_dedupes_and_merges_mutability() {
        let objects = plan_objects(&two_call_plan()).unwrap();
        assert_eq!(objects, vec![(addr(0xc), true), (addr(7), true), (addr(6), false)]);
    }

    #[test]
    fn test_lower_plan_reuses_object_inputs() {
        let plan = two_call_plan();
        let objects: HashMap<_, _> = plan_objects(&plan)
            .unwrap()
            .into_iter()
            .map(|(id, mutable)| {
                (
                    id,
                    ObjectArg::SharedObject {
                        id,
                        initial_shared_version: 1,
                        mutable,
                    },
                )
            })
            .collect();

        let pt = lower_plan(&plan, &objects).unwrap();
        assert_eq!(pt.inputs.len(), 4);
        assert_eq!(pt.commands.len(), 2);

        let Command::MoveCall(create) = &pt.commands[1];
        assert_eq!(
            create.arguments,
            vec![
                Argument::Input(1),
                Argument::Result(0),
                Argument::Input(2),
                Argument::Input(3),
            ]
        );
    }

    #[test]
    fn test_lower_plan_requires_resolution() {
        assert!(lower_plan(&two_call_plan(), &HashMap::new()).is_err());
    }
}
