pub mod basic_elements;
pub mod client;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod entities;
pub mod error;
pub mod helpers;
pub mod types;

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, sync::Arc, time::Duration};

    use alloy_primitives::U256;

    use crate::{
        basic_elements::{args::Args, keys::PrivateKey, typed_value::TypedValue},
        client::{
            LedgerNetwork,
            dispatcher::Dispatcher,
            local_ledger::{CallContext, ContractLogic, GasMeter, LocalLedger, Revert},
        },
        config::DispatcherConfig,
        constants::GAS_DEPLOYMENT,
        crypto::{operator::OperatorSigner, traits::signer::TransactionSigner},
        entities::{
            ContractKind, Entity, FromQueryResult, Operation, Stored,
            billing::UtilityBill,
            by_id, descriptor_by_name, get_all,
            institution::{self, InstitutionDetails},
        },
        error::{DispatchError, NetworkError},
        types::{
            ContractHandle, ContractQuery, FailureReason, QueryOutcome, ReceiptStatus,
            SignedTransaction, SubmitAck, TransactionId, TransactionRecord, ValueTag,
        },
    };

    const BOARD_BYTECODE: &[u8] = b"utility-board-v1";
    const BILL_WRITE_GAS: u64 = 50_000;
    const BILL_FIELDS: [ValueTag; 9] = [
        ValueTag::Uint256,
        ValueTag::Uint256,
        ValueTag::Uint256,
        ValueTag::Uint256,
        ValueTag::Uint256,
        ValueTag::String,
        ValueTag::String,
        ValueTag::Uint256,
        ValueTag::Uint256,
    ];

    /// Electricity board contract: institution details plus a bill register.
    #[derive(Clone)]
    struct UtilityBoard {
        owner: String,
        name: String,
        next_id: U256,
        bills: BTreeMap<U256, (Vec<TypedValue>, bool)>,
    }

    impl UtilityBoard {
        fn bill_id(&self, args: &mut Args) -> Result<U256, Revert> {
            let id = args.next_u256()?;
            if !self.bills.contains_key(&id) {
                return Err(Revert::reason("Bill not found"));
            }
            Ok(id)
        }
    }

    impl ContractLogic for UtilityBoard {
        fn call(
            &mut self,
            context: &CallContext,
            function: &str,
            args: &mut Args,
            gas: &mut GasMeter,
        ) -> Result<Args, Revert> {
            let mut result = Args::new();
            match function {
                "getSTEGOwner" => {
                    result.add_string(&self.owner)?;
                }
                "getSTEGName" => {
                    result.add_string(&self.name)?;
                }
                "addBill" => {
                    context.require_owner()?;
                    let fields = BILL_FIELDS
                        .iter()
                        .map(|tag| TypedValue::decode_from(args, *tag))
                        .collect::<anyhow::Result<Vec<_>>>()?;
                    gas.charge(BILL_WRITE_GAS)?;
                    self.next_id += U256::from(1u64);
                    self.bills.insert(self.next_id, (fields, false));
                }
                "getBill" => {
                    let id = self.bill_id(args)?;
                    if let Some((fields, paid)) = self.bills.get(&id) {
                        result.add_u256(id);
                        for field in fields {
                            field.encode_into(&mut result)?;
                        }
                        result.add_bool(*paid);
                    }
                }
                "payBill" => {
                    let id = self.bill_id(args)?;
                    gas.charge(BILL_WRITE_GAS)?;
                    if let Some(bill) = self.bills.get_mut(&id) {
                        bill.1 = true;
                    }
                }
                "deleteBill" => {
                    context.require_owner()?;
                    let id = self.bill_id(args)?;
                    gas.charge(BILL_WRITE_GAS)?;
                    self.bills.remove(&id);
                }
                "getAllBills" => {
                    let ids: Vec<U256> = self.bills.keys().copied().collect();
                    result.add_u256_array(&ids)?;
                }
                other => return Err(Revert::reason(format!("unknown function {other}"))),
            }
            Ok(result)
        }

        fn box_clone(&self) -> Box<dyn ContractLogic> {
            Box::new(self.clone())
        }
    }

    fn fast_config() -> DispatcherConfig {
        DispatcherConfig {
            call_timeout: Duration::from_secs(1),
            receipt_timeout: Duration::ZERO,
            poll_interval: Duration::from_millis(1),
            max_transport_attempts: 3,
            transport_backoff: Duration::from_millis(1),
            requery_attempts: 1,
            requery_backoff: Duration::from_millis(1),
            max_resubmissions: 2,
        }
    }

    /// Applies every submission, but answers only after `delay`.
    struct SlowSubmit {
        inner: LocalLedger,
        delay: Duration,
    }

    impl LedgerNetwork for SlowSubmit {
        async fn submit(&self, transaction: &SignedTransaction) -> Result<SubmitAck, NetworkError> {
            let ack = self.inner.submit(transaction).await;
            tokio::time::sleep(self.delay).await;
            ack
        }

        async fn transaction_record(
            &self,
            transaction_id: &TransactionId,
        ) -> Result<Option<TransactionRecord>, NetworkError> {
            self.inner.transaction_record(transaction_id).await
        }

        async fn call_query(&self, query: &ContractQuery) -> Result<QueryOutcome, NetworkError> {
            self.inner.call_query(query).await
        }
    }

    fn setup() -> (LocalLedger, Dispatcher<LocalLedger>) {
        let ledger = LocalLedger::new();
        ledger.register_bytecode(
            BOARD_BYTECODE,
            Arc::new(|_: &CallContext, args: &mut Args, _: &mut GasMeter| {
                let board = UtilityBoard {
                    owner: args.next_string()?,
                    name: args.next_string()?,
                    next_id: U256::ZERO,
                    bills: BTreeMap::new(),
                };
                Ok(Box::new(board) as Box<dyn ContractLogic>)
            }),
        );

        let key = PrivateKey::generate();
        let account = ledger.create_account(&key.public_key());
        let operator = OperatorSigner::new(account, key);
        let dispatcher = Dispatcher::new(ledger.clone(), operator, fast_config());
        (ledger, dispatcher)
    }

    async fn deploy_board(dispatcher: &Dispatcher<LocalLedger>, name: &str) -> ContractHandle {
        let details = InstitutionDetails::new(dispatcher.account_id().to_string(), name);
        dispatcher
            .deploy(BOARD_BYTECODE, &details.constructor_params(), GAS_DEPLOYMENT)
            .await
            .unwrap()
    }

    fn bill(amount: u64) -> UtilityBill {
        UtilityBill {
            previous_index: U256::from(1_000u64),
            new_index: U256::from(1_240u64),
            months: U256::from(2u64),
            vat: U256::from(19u64),
            amount: U256::from(amount),
            description: "Electricity".to_string(),
            address: "5 Avenue Habib Bourguiba".to_string(),
            beginning_date: U256::from(1_704_067_200u64),
            end_date: U256::from(1_709_251_200u64),
        }
    }

    async fn bill_ids(dispatcher: &Dispatcher<LocalLedger>, contract: ContractHandle) -> Vec<U256> {
        let call = get_all(ContractKind::Steg, contract, Entity::UtilityBill).unwrap();
        dispatcher.query(&call).await.unwrap().get_u256_array(0).unwrap()
    }

    #[tokio::test]
    async fn deployments_are_independent() -> anyhow::Result<()> {
        let (ledger, dispatcher) = setup();
        let north = deploy_board(&dispatcher, "STEG North").await;
        let south = deploy_board(&dispatcher, "STEG South").await;
        assert_ne!(north, south);
        assert_eq!(ledger.contract_count(), 2);

        let receipt = dispatcher
            .execute(&crate::entities::add(ContractKind::Steg, north, &bill(120))?)
            .await?;
        assert!(receipt.is_success());

        assert_eq!(bill_ids(&dispatcher, north).await.len(), 1);
        assert!(bill_ids(&dispatcher, south).await.is_empty());

        let name = dispatcher
            .query(&institution::get_name(ContractKind::Steg, south)?)
            .await?;
        assert_eq!(name.get_string(0)?, "STEG South");
        Ok(())
    }

    #[tokio::test]
    async fn add_get_delete_bill() -> anyhow::Result<()> {
        let (_, dispatcher) = setup();
        let contract = deploy_board(&dispatcher, "STEG").await;

        let receipt = dispatcher
            .execute(&crate::entities::add(ContractKind::Steg, contract, &bill(87))?)
            .await?;
        assert_eq!(receipt.status, ReceiptStatus::Success);
        let id = bill_ids(&dispatcher, contract).await[0];

        let get = by_id(ContractKind::Steg, contract, Entity::UtilityBill, Operation::Get, id)?;
        let stored = Stored::<UtilityBill>::from_result(&dispatcher.query(&get).await?)?;
        assert_eq!(stored.id, id);
        assert_eq!(stored.record.amount, U256::from(87u64));
        assert!(!stored.paid);

        let pay = by_id(ContractKind::Steg, contract, Entity::UtilityBill, Operation::Pay, id)?;
        assert!(dispatcher.execute(&pay).await?.is_success());
        let stored = Stored::<UtilityBill>::from_result(&dispatcher.query(&get).await?)?;
        assert!(stored.paid);

        let delete = by_id(ContractKind::Steg, contract, Entity::UtilityBill, Operation::Delete, id)?;
        assert!(dispatcher.execute(&delete).await?.is_success());

        match dispatcher.query(&get).await {
            Err(DispatchError::QueryRejected {
                reason: FailureReason::Reverted(message),
                ..
            }) => assert!(message.contains("not found")),
            other => panic!("expected a not found rejection, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn non_owner_cannot_write() -> anyhow::Result<()> {
        let (ledger, dispatcher) = setup();
        let contract = deploy_board(&dispatcher, "STEG").await;

        let key = PrivateKey::generate();
        let stranger = OperatorSigner::new(ledger.create_account(&key.public_key()), key);
        let as_stranger = dispatcher.with_signer(Arc::new(stranger));

        let receipt = as_stranger
            .execute(&crate::entities::add(ContractKind::Steg, contract, &bill(10))?)
            .await?;
        assert_eq!(receipt.failure(), Some(&FailureReason::Unauthorized));
        assert!(bill_ids(&dispatcher, contract).await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn insufficient_gas_leaves_no_effect() -> anyhow::Result<()> {
        let (_, dispatcher) = setup();
        let contract = deploy_board(&dispatcher, "STEG").await;

        let starved =
            crate::entities::add(ContractKind::Steg, contract, &bill(10))?.with_gas_limit(30_000)?;
        let receipt = dispatcher.execute(&starved).await?;
        assert_eq!(receipt.failure(), Some(&FailureReason::InsufficientGas));
        assert!(bill_ids(&dispatcher, contract).await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn queries_repeat_without_side_effects() -> anyhow::Result<()> {
        let (ledger, dispatcher) = setup();
        let contract = deploy_board(&dispatcher, "STEG").await;
        let submissions = ledger.submission_count();

        let owner = institution::get_owner(ContractKind::Steg, contract)?;
        let first = dispatcher.query(&owner).await?;
        ledger.fail_next_queries(1);
        let second = dispatcher.query(&owner).await?;

        assert_eq!(first, second);
        assert_eq!(first.get_string(0)?, dispatcher.account_id().to_string());
        assert_eq!(ledger.submission_count(), submissions);
        Ok(())
    }

    #[tokio::test]
    async fn schema_mismatch_is_caught_before_submission() -> anyhow::Result<()> {
        let (ledger, dispatcher) = setup();
        let contract = deploy_board(&dispatcher, "STEG").await;
        let submissions = ledger.submission_count();

        let wrong_arity =
            descriptor_by_name(ContractKind::Steg, contract, "addBill", vec![TypedValue::uint(1)]);
        assert!(matches!(wrong_arity, Err(DispatchError::Validation { .. })));

        let wrong_tag = descriptor_by_name(
            ContractKind::Steg,
            contract,
            "payBill",
            vec![TypedValue::string("one")],
        );
        assert!(matches!(wrong_tag, Err(DispatchError::Validation { .. })));

        let read = institution::get_name(ContractKind::Steg, contract)?;
        assert!(matches!(
            dispatcher.execute(&read).await,
            Err(DispatchError::Validation { .. })
        ));
        assert_eq!(ledger.submission_count(), submissions);
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_ledger_is_retried_once_applied() -> anyhow::Result<()> {
        let (ledger, dispatcher) = setup();
        let contract = deploy_board(&dispatcher, "STEG").await;
        let submissions = ledger.submission_count();

        ledger.fail_next_submissions(2);
        let receipt = dispatcher
            .execute(&crate::entities::add(ContractKind::Steg, contract, &bill(40))?)
            .await?;
        assert!(receipt.is_success());
        assert_eq!(ledger.submission_count(), submissions + 1);
        assert_eq!(bill_ids(&dispatcher, contract).await.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn exhausted_retries_are_a_transport_error() -> anyhow::Result<()> {
        let (ledger, dispatcher) = setup();
        let contract = deploy_board(&dispatcher, "STEG").await;

        ledger.fail_next_submissions(3);
        let result = dispatcher
            .execute(&crate::entities::add(ContractKind::Steg, contract, &bill(40))?)
            .await;
        assert!(matches!(result, Err(DispatchError::Transport { attempts: 3, .. })));
        assert!(bill_ids(&dispatcher, contract).await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn lost_outcome_without_key_is_not_resubmitted() -> anyhow::Result<()> {
        let (ledger, dispatcher) = setup();
        let contract = deploy_board(&dispatcher, "STEG").await;
        let submissions = ledger.submission_count();

        ledger.interrupt_next_submissions(1);
        ledger.withhold_next_record_lookups(2);
        let result = dispatcher
            .execute(&crate::entities::add(ContractKind::Steg, contract, &bill(40))?)
            .await;

        assert!(matches!(result, Err(DispatchError::Ambiguous { .. })));
        assert_eq!(ledger.submission_count(), submissions + 1);
        // The ledger did apply it; only the caller does not know.
        assert_eq!(bill_ids(&dispatcher, contract).await.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn lost_outcome_with_key_resolves_exactly_once() -> anyhow::Result<()> {
        let (ledger, dispatcher) = setup();
        let contract = deploy_board(&dispatcher, "STEG").await;
        let submissions = ledger.submission_count();

        ledger.interrupt_next_submissions(1);
        ledger.withhold_next_record_lookups(2);
        let call = crate::entities::add(ContractKind::Steg, contract, &bill(40))?
            .with_idempotency_key("steg-bill-2024-01");
        let receipt = dispatcher.execute(&call).await?;

        assert!(receipt.is_success());
        assert_eq!(ledger.submission_count(), submissions + 2);
        assert_eq!(bill_ids(&dispatcher, contract).await.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn reused_key_on_another_call_is_applied() -> anyhow::Result<()> {
        let (_, dispatcher) = setup();
        let contract = deploy_board(&dispatcher, "STEG").await;

        let small = crate::entities::add(ContractKind::Steg, contract, &bill(10))?
            .with_idempotency_key("monthly-run");
        let large = crate::entities::add(ContractKind::Steg, contract, &bill(999))?
            .with_idempotency_key("monthly-run");

        let first = dispatcher.execute(&small).await?;
        let second = dispatcher.execute(&large).await?;
        assert!(first.is_success());
        assert!(second.is_success());
        assert_ne!(first.transaction_id, second.transaction_id);
        assert_eq!(bill_ids(&dispatcher, contract).await.len(), 2);

        // Same key and same call is the same transaction.
        let again = dispatcher.execute(&small).await?;
        assert_eq!(again.transaction_id, first.transaction_id);
        assert_eq!(bill_ids(&dispatcher, contract).await.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn rejected_deployments_create_nothing() -> anyhow::Result<()> {
        let (ledger, dispatcher) = setup();
        let details = InstitutionDetails::new(dispatcher.account_id().to_string(), "STEG");

        let unknown = dispatcher
            .deploy(b"not-a-contract", &details.constructor_params(), GAS_DEPLOYMENT)
            .await;
        assert!(matches!(
            unknown,
            Err(DispatchError::DeployRejected(FailureReason::InvalidTransaction(_)))
        ));

        let starved = dispatcher
            .deploy(BOARD_BYTECODE, &details.constructor_params(), 100_000)
            .await;
        assert!(matches!(
            starved,
            Err(DispatchError::DeployRejected(FailureReason::InsufficientGas))
        ));
        assert_eq!(ledger.contract_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn deploy_reads_bytecode_from_file() -> anyhow::Result<()> {
        let (_, dispatcher) = setup();
        let details = InstitutionDetails::new(dispatcher.account_id().to_string(), "SONEDE");
        let path = std::env::temp_dir().join(format!("utility-board-{}.bin", rand::random::<u64>()));
        tokio::fs::write(&path, BOARD_BYTECODE).await?;

        let deployed = dispatcher
            .deploy_from_file(&path, &details.constructor_params(), GAS_DEPLOYMENT)
            .await;
        tokio::fs::remove_file(&path).await?;

        let name = dispatcher
            .query(&institution::get_name(ContractKind::Steg, deployed?)?)
            .await?;
        assert_eq!(name.get_string(0)?, "SONEDE");

        let missing = dispatcher
            .deploy_from_file(&path, &details.constructor_params(), GAS_DEPLOYMENT)
            .await;
        assert!(matches!(missing, Err(DispatchError::Bytecode(_))));
        Ok(())
    }

    #[tokio::test]
    async fn timed_out_submission_is_resolved_by_record() -> anyhow::Result<()> {
        let (ledger, _) = setup();
        let key = PrivateKey::generate();
        let operator = OperatorSigner::new(ledger.create_account(&key.public_key()), key);
        let owner = operator.account_id().to_string();
        let slow = SlowSubmit {
            inner: ledger.clone(),
            delay: Duration::from_millis(200),
        };
        let dispatcher = Dispatcher::new(slow, operator, fast_config()).with_config(DispatcherConfig {
            call_timeout: Duration::from_millis(20),
            ..fast_config()
        });
        assert_eq!(dispatcher.config().call_timeout, Duration::from_millis(20));

        let details = InstitutionDetails::new(owner, "STEG");
        let contract = dispatcher
            .deploy(BOARD_BYTECODE, &details.constructor_params(), GAS_DEPLOYMENT)
            .await?;
        let submissions = ledger.submission_count();

        let receipt = dispatcher
            .execute(&crate::entities::add(ContractKind::Steg, contract, &bill(40))?)
            .await?;
        assert!(receipt.is_success());
        assert_eq!(ledger.submission_count(), submissions + 1);

        let ids = dispatcher
            .query(&get_all(ContractKind::Steg, contract, Entity::UtilityBill)?)
            .await?
            .get_u256_array(0)?;
        assert_eq!(ids.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn signer_identity_follows_with_signer() {
        let (ledger, dispatcher) = setup();
        let key = PrivateKey::generate();
        let other = OperatorSigner::new(ledger.create_account(&key.public_key()), key);
        let other_id = *other.account_id();

        let switched = dispatcher.with_signer(Arc::new(other));
        assert_eq!(switched.account_id(), &other_id);
        assert_ne!(dispatcher.account_id(), &other_id);
    }
}
