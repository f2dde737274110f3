//! Bundled build artifact and deployment address for the `Voting` contract.

use crate::abi::{Abi, AbiError};

/// The Hardhat artifact for `contracts/Voting.sol`, embedded at build time.
pub const VOTING_ARTIFACT: &str = include_str!("../artifacts/Voting.json");

/// Where the `Voting` contract is deployed.
pub const VOTING_CONTRACT_ADDRESS: &str = "0x59D88aD5bD90ebbBBcb135D65011e386f17f6359";

/// Parse [`VOTING_ARTIFACT`].
pub fn voting_abi() -> Result<Abi, AbiError> {
    Abi::from_json(VOTING_ARTIFACT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;

    #[test]
    fn bundled_artifact_parses() {
        let abi = voting_abi().unwrap();
        let read_only = |name: &str, arity: usize| {
            crate::abi::is_read_only(abi.function(name, arity).unwrap().state_mutability)
        };
        assert!(read_only("owner", 0));
        assert!(read_only("getVoter", 1));
        assert!(!read_only("setVote", 1));
        assert_eq!(abi.events().count(), 5);
    }

    #[test]
    fn bundled_selectors() {
        let abi = voting_abi().unwrap();
        let sel = |name: &str, arity: usize| {
            hex::encode(abi.function(name, arity).unwrap().selector())
        };
        assert_eq!(sel("getVoter", 1), "d4f50f98");
        assert_eq!(sel("workflowStatus", 0), "a1edffa2");
        assert_eq!(sel("winningProposalID", 0), "bdc01431");
    }

    #[test]
    fn deployed_address_is_checksummed() {
        let a = Address::parse(VOTING_CONTRACT_ADDRESS).unwrap();
        assert_eq!(a.to_checksum(), VOTING_CONTRACT_ADDRESS);
    }
}
