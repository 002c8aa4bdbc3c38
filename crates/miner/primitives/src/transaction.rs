use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_rlp::{BufMut, Encodable, EMPTY_STRING_CODE};

/// A signed transaction with its sender already recovered.
///
/// Legacy transactions carry their gas price in both fee fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    /// Recovered sender.
    pub signer: Address,
    /// `Some` for replay protected signatures.
    pub chain_id: Option<u64>,
    pub nonce: u64,
    pub gas_limit: u64,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
    /// Currency the fees are paid in, `None` for the native currency.
    pub fee_currency: Option<Address>,
    /// Deprecated fee mechanism, rejected once [`crate::Fork::BaseFee`] is active.
    pub gateway_fee_recipient: Option<Address>,
    pub gateway_fee: U256,
    pub to: Option<Address>,
    pub value: U256,
    pub input: Bytes,
}

impl Transaction {
    pub const fn signer(&self) -> Address {
        self.signer
    }

    pub const fn nonce(&self) -> u64 {
        self.nonce
    }

    pub const fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    pub const fn fee_currency(&self) -> Option<Address> {
        self.fee_currency
    }

    /// Whether the signature is bound to a chain id.
    pub const fn is_protected(&self) -> bool {
        self.chain_id.is_some()
    }

    /// Whether the deprecated gateway fee fields are in use.
    pub fn gateway_set(&self) -> bool {
        self.gateway_fee_recipient.is_some() || !self.gateway_fee.is_zero()
    }

    /// Tip paid per unit of gas on top of `base_fee`.
    ///
    /// Without a base fee this is the priority fee. A fee cap below the base fee
    /// yields zero.
    pub fn effective_gas_tip(&self, base_fee: Option<U256>) -> U256 {
        match base_fee {
            None => self.max_priority_fee_per_gas,
            Some(base_fee) => self
                .max_fee_per_gas
                .saturating_sub(base_fee)
                .min(self.max_priority_fee_per_gas),
        }
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> u64 {
        self.length() as u64
    }

    pub fn hash(&self) -> B256 {
        keccak256(alloy_rlp::encode(self))
    }

    fn fields_len(&self) -> usize {
        opt_length(&self.chain_id)
            + self.nonce.length()
            + self.gas_limit.length()
            + self.max_fee_per_gas.length()
            + self.max_priority_fee_per_gas.length()
            + opt_length(&self.fee_currency)
            + opt_length(&self.gateway_fee_recipient)
            + self.gateway_fee.length()
            + opt_length(&self.to)
            + self.value.length()
            + self.input.length()
            + self.signer.length()
    }
}

impl Encodable for Transaction {
    fn encode(&self, out: &mut dyn BufMut) {
        alloy_rlp::Header {
            list: true,
            payload_length: self.fields_len(),
        }
        .encode(out);
        encode_opt(&self.chain_id, out);
        self.nonce.encode(out);
        self.gas_limit.encode(out);
        self.max_fee_per_gas.encode(out);
        self.max_priority_fee_per_gas.encode(out);
        encode_opt(&self.fee_currency, out);
        encode_opt(&self.gateway_fee_recipient, out);
        self.gateway_fee.encode(out);
        encode_opt(&self.to, out);
        self.value.encode(out);
        self.input.encode(out);
        self.signer.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.fields_len();
        payload_length + alloy_rlp::length_of_length(payload_length)
    }
}

fn encode_opt<T: Encodable>(value: &Option<T>, out: &mut dyn BufMut) {
    match value {
        Some(value) => value.encode(out),
        None => out.put_u8(EMPTY_STRING_CODE),
    }
}

fn opt_length<T: Encodable>(value: &Option<T>) -> usize {
    value.as_ref().map_or(1, Encodable::length)
}
