use wasm_bindgen::prelude::*;
use web_sys::{window, CustomEvent, CustomEventInit};
use yew::prelude::*;
use wasm_bindgen::JsCast;

pub const TIV_BALANCE_EVENT: &str = "tivBalanceUpdate";

/// Broadcasts a new TIV total to every mounted `use_tiv_balance` hook.
pub fn dispatch_tiv_balance(new_total: i64) {
    if let Some(window) = window() {
        let event_init = CustomEventInit::new();
        event_init.set_detail(&JsValue::from_f64(new_total as f64));
        if let Ok(event) = CustomEvent::new_with_event_init_dict(TIV_BALANCE_EVENT, &event_init) {
            let _ = window.dispatch_event(&event);
        }
    }
}

#[hook]
pub fn use_tiv_balance() -> UseStateHandle<i64> {
    let balance = use_state(|| {
        window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|s| s.get_item("tiv_balance").ok().flatten())
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0)
    });

    {
        let balance = balance.clone();
        use_effect(move || {
            let handle = balance.clone();

            let listener = Closure::wrap(Box::new(move |e: CustomEvent| {
                if let Some(new_total) = e.detail().as_f64() {
                    handle.set(new_total as i64);

                    if let Some(w) = window() {
                        if let Ok(Some(storage)) = w.local_storage() {
                            let _ = storage.set_item("tiv_balance", &(new_total as i64).to_string());
                        }
                    }
                }
            }) as Box<dyn FnMut(CustomEvent)>);

            if let Some(window) = window() {
                let _ = window.add_event_listener_with_callback(
                    TIV_BALANCE_EVENT,
                    listener.as_ref().unchecked_ref()
                );
            }

            // Keep the closure alive for the component lifetime
            let cleanup_listener = listener;

            move || {
                if let Some(window) = window() {
                    let _ = window.remove_event_listener_with_callback(
                        TIV_BALANCE_EVENT,
                        cleanup_listener.as_ref().unchecked_ref()
                    );
                }
            }
        });
    }

    balance
}
