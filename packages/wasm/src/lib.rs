//! WebAssembly bindings for the votelink session protocol.
//!
//! Compile with `wasm-pack build` to produce an npm-ready package the voting
//! front end imports.
//!
//! ## Address helpers: [`display_address`], [`checksum_address`]
//!
//! Pure functions, usable in any WASM host.
//!
//! ```js
//! import init, { displayAddress, checksumAddress } from './votelink_wasm.js';
//! await init();
//!
//! displayAddress('0xABCDEF1234567890ABCDEF1234567890ABCDEF12'); // '0xABCD...EF12'
//! ```
//!
//! ## Sessions: `Connector`, `VoteSession`, `establishSession`
//!
//! Browser only: the wallet is found at `window.ethereum` (or the legacy
//! `window.web3.currentProvider`).
//!
//! ```js
//! const connector = new Connector();          // bundled contract + interface
//! try {
//!   const session = await connector.connect();
//!   header.textContent = session.displayAddress;
//!   adminPanel.hidden = !session.isOwner;
//!   const status = await session.call('workflowStatus', []);
//! } catch (err) {
//!   // err.kind: 'NoProviderAvailable' | 'AccountAccessDenied' | ...
//!   alert(err.userMessage);
//! }
//!
//! // Re-run on wallet changes; only the newest run's outcome is kept.
//! window.ethereum.on('accountsChanged', () => connector.connect().then(render, fail));
//! ```

use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod injected;
#[cfg(target_arch = "wasm32")]
pub use injected::{InjectedLocator, InjectedProvider};

/// One-time initialisation called at the start of every exported function.
///
/// Installs the `console_error_panic_hook` when the feature is enabled so
/// that Rust panics are forwarded to the browser console as readable errors
/// rather than appearing as generic "unreachable" WASM traps.
fn setup() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Shorten an account for display: first 6 and last 4 characters.
///
/// ```js
/// displayAddress('0xABCDEF1234567890ABCDEF1234567890ABCDEF12'); // '0xABCD...EF12'
/// ```
#[wasm_bindgen(js_name = displayAddress)]
pub fn display_address(account: &str) -> String {
    setup();
    votelink::display_address(&votelink::AccountAddress::new(account))
}

/// Return the EIP-55 checksum form of `address`.
///
/// Throws a descriptive string if `address` is not `0x` plus 40 hex digits
/// or is mixed-case with a wrong checksum.
#[wasm_bindgen(js_name = checksumAddress)]
pub fn checksum_address(address: &str) -> Result<String, JsValue> {
    setup();
    votelink::Address::parse(address)
        .map(|a| a.to_checksum())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// The address the bundled `Voting` contract is deployed at.
#[wasm_bindgen(js_name = votingContractAddress)]
pub fn voting_contract_address() -> String {
    votelink::artifacts::VOTING_CONTRACT_ADDRESS.to_string()
}

/// The generic notice to show the user when a session fails.
#[wasm_bindgen(js_name = failureNotice)]
pub fn failure_notice() -> String {
    votelink::USER_NOTICE.to_string()
}

#[cfg(target_arch = "wasm32")]
pub use browser::{establish_session, Connector, VoteSession};

#[cfg(target_arch = "wasm32")]
mod browser {
    use std::sync::Arc;

    use js_sys::{Promise, Reflect, JSON};
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::future_to_promise;

    use votelink::artifacts::{VOTING_ARTIFACT, VOTING_CONTRACT_ADDRESS};
    use votelink::{codec, Session, SessionAssembler, SessionFailure, SessionSlot};

    use super::{setup, InjectedLocator};

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = console, js_name = error)]
        fn console_error(message: &str);
    }

    /// Establishes sessions against the injected wallet and keeps only the
    /// newest outcome.
    #[wasm_bindgen]
    pub struct Connector {
        assembler: Arc<SessionAssembler>,
        slot: Arc<SessionSlot>,
    }

    #[wasm_bindgen]
    impl Connector {
        /// `contractAddress` and `abiJson` default to the bundled `Voting`
        /// deployment and artifact.
        #[wasm_bindgen(constructor)]
        pub fn new(contract_address: Option<String>, abi_json: Option<String>) -> Connector {
            setup();
            let assembler = SessionAssembler::from_json(
                Arc::new(InjectedLocator),
                contract_address.unwrap_or_else(|| VOTING_CONTRACT_ADDRESS.to_string()),
                abi_json.unwrap_or_else(|| VOTING_ARTIFACT.to_string()),
            );
            Connector {
                assembler: Arc::new(assembler),
                slot: Arc::new(SessionSlot::new()),
            }
        }

        /// Run every stage. Resolves with the newest published
        /// [`VoteSession`]; rejects with an `Error` carrying `kind` and
        /// `userMessage` when the newest outcome is a failure.
        pub fn connect(&self) -> Promise {
            let assembler = Arc::clone(&self.assembler);
            let slot = Arc::clone(&self.slot);
            future_to_promise(async move {
                assembler.establish_into(&slot).await;
                match slot.current() {
                    Some(Ok(session)) => Ok(VoteSession { inner: session }.into()),
                    Some(Err(failure)) => Err(failure_to_js(&failure)?),
                    None => Err(JsValue::from_str("no session outcome was published")),
                }
            })
        }
    }

    /// An established session, as seen from JavaScript.
    #[wasm_bindgen]
    pub struct VoteSession {
        inner: Session,
    }

    #[wasm_bindgen]
    impl VoteSession {
        #[wasm_bindgen(getter, js_name = displayAddress)]
        pub fn display_address(&self) -> String {
            self.inner.display_address().to_string()
        }

        #[wasm_bindgen(getter, js_name = activeAccount)]
        pub fn active_account(&self) -> String {
            self.inner.active_account().to_string()
        }

        #[wasm_bindgen(getter, js_name = isOwner)]
        pub fn is_owner(&self) -> bool {
            self.inner.is_owner()
        }

        /// `"owner"` or `"voter"`.
        #[wasm_bindgen(getter)]
        pub fn role(&self) -> String {
            match self.inner.role() {
                votelink::Role::Owner => "owner".into(),
                votelink::Role::Voter => "voter".into(),
            }
        }

        #[wasm_bindgen(getter)]
        pub fn contract(&self) -> String {
            self.inner.contract().address().to_checksum()
        }

        /// The whole session summary as a plain object.
        #[wasm_bindgen(js_name = toJSON)]
        pub fn to_json(&self) -> Result<JsValue, JsValue> {
            let text = serde_json::to_string(&self.inner.summary())
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            JSON::parse(&text)
        }

        /// Call a read-only contract method. `args` are strings parsed
        /// against the method's declared input types. Resolves with the
        /// decoded outputs as a plain array.
        pub fn call(&self, method: String, args: Vec<String>) -> Promise {
            let session = self.inner.clone();
            future_to_promise(async move {
                let contract = session.contract();
                let function = contract
                    .abi()
                    .function(&method, args.len())
                    .ok_or_else(|| JsValue::from_str(&format!("no method {method}/{}", args.len())))?;
                let values = codec::parse_args(function, &args)
                    .map_err(|e| JsValue::from_str(&e.to_string()))?;

                let outputs = contract
                    .call(&method, &values)
                    .await
                    .map_err(|e| JsValue::from_str(&e.to_string()))?;
                let json = serde_json::Value::Array(outputs.iter().map(codec::to_json).collect());
                JSON::parse(&json.to_string())
            })
        }
    }

    /// One-shot form of `new Connector().connect()` for the bundled
    /// contract.
    #[wasm_bindgen(js_name = establishSession)]
    pub fn establish_session() -> Promise {
        Connector::new(None, None).connect()
    }

    /// An `Error` carrying `kind` and `userMessage`. A failure to attach
    /// either is returned as the rejection instead.
    fn failure_to_js(failure: &SessionFailure) -> Result<JsValue, JsValue> {
        console_error(&format!("votelink: {failure}"));
        let error = js_sys::Error::new(&failure.to_string());
        Reflect::set(
            &error,
            &JsValue::from_str("kind"),
            &JsValue::from_str(failure.kind.as_str()),
        )?;
        Reflect::set(
            &error,
            &JsValue::from_str("userMessage"),
            &JsValue::from_str(failure.user_message()),
        )?;
        Ok(error.into())
    }
}
