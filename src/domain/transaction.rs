//! Chain-neutral description of a programmable transaction.
//!
//! Use cases describe what to call as a `TransactionPlan`; the chain
//! adapter resolves object references, encodes BCS and signs. Keeping the
//! plan as plain data lets tests assert on the exact call sequence.

use serde::Serialize;

use super::vault::{MoveType, ObjectId};

/// Well-known shared clock object.
pub const CLOCK_OBJECT_ID: &str = "0x6";

/// One argument to a Move call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CallInput {
    /// An on-chain object; `mutable` only matters for shared objects.
    Object { id: ObjectId, mutable: bool },
    PureU64(u64),
    PureU8(u8),
    /// Output of an earlier command in the same transaction.
    Result(u16),
}

impl CallInput {
    pub fn object(id: impl Into<ObjectId>) -> Self {
        Self::Object {
            id: id.into(),
            mutable: true,
        }
    }

    pub fn immutable(id: impl Into<ObjectId>) -> Self {
        Self::Object {
            id: id.into(),
            mutable: false,
        }
    }
}

/// `package::module::function<type_arguments>(arguments)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveCall {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<MoveType>,
    pub arguments: Vec<CallInput>,
}

impl MoveCall {
    /// `package::module::function`, for logs.
    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.function)
    }
}

/// Ordered commands executed atomically in one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionPlan {
    pub calls: Vec<MoveCall>,
}

impl TransactionPlan {
    pub fn single(call: MoveCall) -> Self {
        Self { calls: vec![call] }
    }

    /// Append a call and return a handle to its result.
    pub fn push(&mut self, call: MoveCall) -> CallInput {
        let index = u16::try_from(self.calls.len()).unwrap_or(u16::MAX);
        self.calls.push(call);
        CallInput::Result(index)
    }

    /// Count calls to a given function name.
    pub fn count_calls(&self, function: &str) -> usize {
        self.calls.iter().filter(|c| c.function == function).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(function: &str) -> MoveCall {
        MoveCall {
            package: "0xabc".to_string(),
            module: "mm_vault".to_string(),
            function: function.to_string(),
            type_arguments: vec![],
            arguments: vec![],
        }
    }

    #[test]
    fn test_push_returns_result_handle() {
        let mut plan = TransactionPlan::default();
        assert_eq!(plan.push(call("a")), CallInput::Result(0));
        assert_eq!(plan.push(call("b")), CallInput::Result(1));
        assert_eq!(plan.calls.len(), 2);
        assert_eq!(plan.count_calls("a"), 1);
    }

    #[test]
    fn test_target_format() {
        assert_eq!(call("get_vault_balance").target(), "0xabc::mm_vault::get_vault_balance");
    }

    #[test]
    fn test_object_helpers() {
        assert_eq!(
            CallInput::immutable(CLOCK_OBJECT_ID),
            CallInput::Object { id: "0x6".to_string(), mutable: false }
        );
        assert!(matches!(CallInput::object("0x1"), CallInput::Object { mutable: true, .. }));
    }
}
