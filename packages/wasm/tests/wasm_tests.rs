//! wasm-bindgen-test integration tests for the votelink WASM bindings.
//!
//! Run with:
//!   wasm-pack test packages/wasm --node
//!
//! These tests compile to WASM and execute in a Node.js process, verifying
//! the exported API surface works end-to-end in a JavaScript host. Node has
//! no injected wallet, which is exactly the no-provider case; the session
//! tests install stub wallets on the global object to cover the rest.

use wasm_bindgen_test::*;

// Configure all tests in this file to run in Node.js (no browser required).
wasm_bindgen_test_configure!(run_in_node_experimental);

use votelink_wasm::{checksum_address, display_address, failure_notice, voting_contract_address};

// ---------------------------------------------------------------------------
// displayAddress()
// ---------------------------------------------------------------------------

#[wasm_bindgen_test]
fn display_address_elides_middle() {
    assert_eq!(
        display_address("0xABCDEF1234567890ABCDEF1234567890ABCDEF12"),
        "0xABCD...EF12"
    );
}

#[wasm_bindgen_test]
fn display_address_of_short_account_uses_last_four() {
    assert_eq!(
        display_address("0x1111111111111111111111111111111111111"),
        "0x1111...1111"
    );
}

// ---------------------------------------------------------------------------
// checksumAddress()
// ---------------------------------------------------------------------------

#[wasm_bindgen_test]
fn checksum_address_normalises_lowercase() {
    assert_eq!(
        checksum_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap(),
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
    );
}

#[wasm_bindgen_test]
fn checksum_address_rejects_bad_checksum() {
    assert!(checksum_address("0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
}

#[wasm_bindgen_test]
fn checksum_address_rejects_short_input() {
    assert!(checksum_address("0x1234").is_err());
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

#[wasm_bindgen_test]
fn bundled_contract_address_is_checksummed() {
    let address = voting_contract_address();
    assert_eq!(checksum_address(&address).unwrap(), address);
}

#[wasm_bindgen_test]
fn failure_notice_is_generic() {
    assert_eq!(
        failure_notice(),
        "Failed to load web3, accounts, or contract. Check console for details."
    );
}

// ---------------------------------------------------------------------------
// Sessions (WASM only: needs a JavaScript global object)
// ---------------------------------------------------------------------------

#[cfg(target_arch = "wasm32")]
mod sessions {
    use js_sys::{Array, Function, Object, Reflect};
    use wasm_bindgen::JsValue;
    use wasm_bindgen_futures::JsFuture;
    use wasm_bindgen_test::*;

    use votelink_wasm::{establish_session, Connector};

    const ACCOUNT: &str = "0xabcdef1234567890abcdef1234567890abcdef12";

    /// Answers accounts, `owner()` (returning `owner`) and `workflowStatus()`
    /// (returning 1); everything else is an unsupported method.
    fn chain_body(owner: &str) -> String {
        format!(
            r#"
            if (args.method === 'eth_requestAccounts') return Promise.resolve(['{ACCOUNT}']);
            if (args.method === 'eth_call') {{
                const data = args.params[0].data;
                if (data === '0x8da5cb5b') return Promise.resolve('0x000000000000000000000000{body}');
                if (data === '0xa1edffa2') return Promise.resolve('0x' + '0'.repeat(63) + '1');
            }}
            return Promise.reject({{ code: -32601, message: 'unsupported ' + args.method }});
            "#,
            body = &owner[2..],
        )
    }

    const REJECTING_BODY: &str =
        "return Promise.reject({ code: 4001, message: 'User rejected the request.' });";

    fn wallet(body: &str) -> JsValue {
        let wallet = Object::new();
        let request = Function::new_with_args("args", body);
        Reflect::set(&wallet, &JsValue::from_str("request"), &request).unwrap();
        wallet.into()
    }

    fn install(name: &str, value: &JsValue) {
        Reflect::set(&js_sys::global(), &JsValue::from_str(name), value).unwrap();
    }

    fn uninstall() {
        for name in ["ethereum", "web3"] {
            Reflect::delete_property(&js_sys::global(), &JsValue::from_str(name)).unwrap();
        }
    }

    fn get(target: &JsValue, key: &str) -> JsValue {
        Reflect::get(target, &JsValue::from_str(key)).unwrap()
    }

    fn invoke(target: &JsValue, method: &str, args: &[JsValue]) -> JsValue {
        let f: Function = get(target, method).into();
        let list: Array = args.iter().collect();
        Reflect::apply(&f, target, &list).unwrap()
    }

    fn kind_of(error: &JsValue) -> Option<String> {
        Reflect::get(error, &JsValue::from_str("kind"))
            .ok()
            .and_then(|k| k.as_string())
    }

    #[wasm_bindgen_test]
    async fn no_injected_wallet_is_no_provider() {
        uninstall();
        let err = JsFuture::from(establish_session()).await.unwrap_err();
        assert_eq!(kind_of(&err).as_deref(), Some("NoProviderAvailable"));
    }

    #[wasm_bindgen_test]
    async fn failure_carries_user_message() {
        uninstall();
        let err = JsFuture::from(Connector::new(None, None).connect())
            .await
            .unwrap_err();
        let notice = get(&err, "userMessage").as_string();
        assert_eq!(notice.as_deref(), Some(votelink::USER_NOTICE));
    }

    #[wasm_bindgen_test]
    async fn injected_wallet_owner_session() {
        install("ethereum", &wallet(&chain_body(ACCOUNT)));
        let outcome = JsFuture::from(establish_session()).await;
        uninstall();

        let session = outcome.unwrap();
        assert_eq!(get(&session, "isOwner").as_bool(), Some(true));
        assert_eq!(get(&session, "role").as_string().as_deref(), Some("owner"));
        assert_eq!(get(&session, "activeAccount").as_string().as_deref(), Some(ACCOUNT));
        assert_eq!(
            get(&session, "displayAddress").as_string().as_deref(),
            Some("0xabcd...ef12")
        );
    }

    #[wasm_bindgen_test]
    async fn injected_wallet_decodes_view_call() {
        install("ethereum", &wallet(&chain_body(ACCOUNT)));
        let session = JsFuture::from(establish_session()).await.unwrap();
        let promise = invoke(
            &session,
            "call",
            &[JsValue::from_str("workflowStatus"), Array::new().into()],
        );
        let outcome = JsFuture::from(js_sys::Promise::from(promise)).await;
        uninstall();

        let outputs = Array::from(&outcome.unwrap());
        assert_eq!(outputs.length(), 1);
        assert_eq!(outputs.get(0).as_string().as_deref(), Some("1"));
    }

    #[wasm_bindgen_test]
    async fn rejected_request_is_access_denied() {
        install("ethereum", &wallet(REJECTING_BODY));
        let outcome = JsFuture::from(establish_session()).await;
        uninstall();

        let err = outcome.unwrap_err();
        assert_eq!(kind_of(&err).as_deref(), Some("AccountAccessDenied"));
        assert_eq!(
            get(&err, "userMessage").as_string().as_deref(),
            Some(votelink::USER_NOTICE)
        );
    }

    #[wasm_bindgen_test]
    async fn legacy_current_provider_is_used() {
        let web3 = Object::new();
        let other = "0x1111111111111111111111111111111111111111";
        Reflect::set(&web3, &JsValue::from_str("currentProvider"), &wallet(&chain_body(other)))
            .unwrap();
        install("web3", &web3.into());
        let outcome = JsFuture::from(establish_session()).await;
        uninstall();

        let session = outcome.unwrap();
        assert_eq!(get(&session, "isOwner").as_bool(), Some(false));
        let summary = invoke(&session, "toJSON", &[]);
        assert_eq!(
            get(&summary, "provider").as_string().as_deref(),
            Some("injected window.web3.currentProvider")
        );
        assert_eq!(get(&summary, "role").as_string().as_deref(), Some("voter"));
    }
}
