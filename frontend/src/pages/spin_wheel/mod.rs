mod wheel_view;

use yew::prelude::*;
use futures::future::{select, Either};
use gloo_net::http::Request;
use gloo_timers::callback::Interval;
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen_futures::spawn_local;
use shared::constants::{NETWORK_ERROR, SPIN_FAILED_ERROR};
use shared::spin_wheel::*;
use crate::config::get_api_base_url;
use crate::hooks::auth::{use_auth, AuthContext};
use crate::hooks::use_tiv_balance::dispatch_tiv_balance;
use crate::styles;

use wheel_view::{WheelDisc, RewardDisplay, SpinButton, SpinOutcome};

async fn fetch_spin_status(auth: &AuthContext) -> Result<SpinStatusResponse, String> {
    let response = Request::get(&format!("{}/api/spin/status", get_api_base_url()))
        .header("Authorization", &auth.bearer())
        .send()
        .await
        .map_err(|e| format!("Network error: {:?}", e))?;

    if response.ok() {
        response
            .json::<SpinStatusResponse>()
            .await
            .map_err(|e| format!("Error parsing status response: {:?}", e))
    } else {
        Err(format!("Error status: {}", response.status()))
    }
}

#[function_component(SpinWheel)]
pub fn spin_wheel() -> Html {
    let auth = use_auth();

    let wheel = use_state(WheelState::new);
    let loading = use_state(|| true);
    let cooldown_seconds = use_state(|| 0i64);
    let streak = use_state(|| 0i32);
    let error_message = use_state(String::new);
    let outcome = use_state(|| None::<SpinOutcome>);

    // True from trigger until settle or abort. Survives re-renders, so a
    // burst of clicks inside one render cannot start a second resolver call.
    let in_flight = use_mut_ref(|| false);

    // Cooldown gate check on mount. A failed or empty lookup means "not yet
    // spun", never an error: the gate opens and the server stays authoritative.
    {
        let auth = auth.clone();
        let wheel = wheel.clone();
        let loading = loading.clone();
        let cooldown_seconds = cooldown_seconds.clone();
        let streak = streak.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match fetch_spin_status(&auth).await {
                    Ok(status) => {
                        let mut state = (*wheel).clone();
                        state.apply_status(status.can_spin, status.cooldown_seconds);
                        wheel.set(state);
                        cooldown_seconds.set(status.cooldown_seconds);
                        streak.set(status.streak);
                    }
                    Err(err) => {
                        log::warn!("Spin status lookup failed, defaulting to eligible: {}", err);
                        let mut state = (*wheel).clone();
                        state.apply_status(true, 0);
                        wheel.set(state);
                    }
                }
                loading.set(false);
            });
            || ()
        });
    }

    // Countdown tick. Re-armed on every change so the closures always see
    // the current second count.
    {
        let wheel = wheel.clone();
        let cooldown_seconds = cooldown_seconds.clone();
        let loading = loading.clone();

        use_effect_with((*loading, *cooldown_seconds), move |(loading, seconds)| {
            if *loading || *seconds <= 0 {
                return Box::new(|| ()) as Box<dyn FnOnce()>;
            }

            let seconds = *seconds;
            let interval = Interval::new(1000, move || {
                if seconds > 1 {
                    cooldown_seconds.set(seconds - 1);
                    let mut state = (*wheel).clone();
                    state.apply_status(false, seconds - 1);
                    wheel.set(state);
                } else {
                    cooldown_seconds.set(0);
                    let mut state = (*wheel).clone();
                    state.apply_status(true, 0);
                    wheel.set(state);
                }
            });

            Box::new(move || drop(interval)) as Box<dyn FnOnce()>
        });
    }

    let start_spin = {
        let auth = auth.clone();
        let wheel = wheel.clone();
        let loading = loading.clone();
        let cooldown_seconds = cooldown_seconds.clone();
        let streak = streak.clone();
        let error_message = error_message.clone();
        let outcome = outcome.clone();
        let in_flight = in_flight.clone();

        Callback::from(move |_| {
            if *loading || *in_flight.borrow() {
                return;
            }

            let mut state = (*wheel).clone();
            if !state.begin_spin() {
                return;
            }
            *in_flight.borrow_mut() = true;
            wheel.set(state.clone());
            error_message.set(String::new());
            outcome.set(None);

            let auth = auth.clone();
            let wheel = wheel.clone();
            let cooldown_seconds = cooldown_seconds.clone();
            let streak = streak.clone();
            let error_message = error_message.clone();
            let outcome = outcome.clone();
            let in_flight = in_flight.clone();

            spawn_local(async move {
                let spin_req = SpinRequest {
                    timestamp: js_sys::Date::now() as u64,
                };

                let request = Request::post(&format!("{}/api/spin", get_api_base_url()))
                    .header("Content-Type", "application/json")
                    .header("Authorization", &auth.bearer())
                    .json(&spin_req)
                    .expect("Failed to build request");

                // Bound the call so a hung request cannot pin the wheel in
                // the spinning state.
                let send = Box::pin(request.send());
                let deadline = Box::pin(TimeoutFuture::new(SPIN_NETWORK_TIMEOUT_MS));
                let sent = match select(send, deadline).await {
                    Either::Left((result, _)) => result,
                    Either::Right((_, _)) => {
                        state.abort();
                        wheel.set(state.clone());
                        error_message.set(NETWORK_ERROR.to_string());
                        *in_flight.borrow_mut() = false;
                        return;
                    }
                };

                match sent {
                    Ok(resp) if resp.status() == 200 => {
                        match resp.json::<SpinResponse>().await {
                            Ok(spin) if spin.success => {
                                // Reward is resolved; now let the wheel run
                                // its fixed settle time before revealing it.
                                state.drive(spin_extra_degrees(
                                    js_sys::Math::random(),
                                    js_sys::Math::random(),
                                ));
                                wheel.set(state.clone());

                                TimeoutFuture::new(SPIN_SETTLE_MS).await;

                                state.settle(spin.cooldown_seconds);
                                wheel.set(state.clone());
                                cooldown_seconds.set(spin.cooldown_seconds);
                                streak.set(spin.streak);
                                dispatch_tiv_balance(spin.new_tiv_balance);
                                outcome.set(Some(SpinOutcome {
                                    amount: spin.final_reward,
                                    currency: spin.reward_type.label().to_string(),
                                    doubled: spin.doubled,
                                }));
                            }
                            Ok(spin) => {
                                state.abort();
                                wheel.set(state.clone());
                                error_message.set(
                                    spin.message.unwrap_or_else(|| SPIN_FAILED_ERROR.to_string()),
                                );
                            }
                            Err(_) => {
                                state.abort();
                                wheel.set(state.clone());
                                error_message.set(SPIN_FAILED_ERROR.to_string());
                            }
                        }
                    }
                    Ok(resp) if resp.status() == 429 => {
                        // Cooldown rejection, not a retryable failure: arm
                        // the countdown and show it on the button.
                        let seconds = resp
                            .json::<serde_json::Value>()
                            .await
                            .ok()
                            .and_then(|v| v.get("cooldown_seconds").and_then(|s| s.as_i64()));

                        state.abort();
                        if let Some(seconds) = seconds {
                            state.apply_status(false, seconds);
                            cooldown_seconds.set(seconds);
                        }
                        wheel.set(state.clone());
                        error_message.set(String::new());
                    }
                    Ok(resp) => {
                        // Transient failure: no reward is synthesized and
                        // the gate is left as-is for the next recheck.
                        let message = resp
                            .json::<serde_json::Value>()
                            .await
                            .ok()
                            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                            .unwrap_or_else(|| SPIN_FAILED_ERROR.to_string());

                        state.abort();
                        wheel.set(state.clone());
                        error_message.set(message);
                    }
                    Err(_) => {
                        state.abort();
                        wheel.set(state.clone());
                        error_message.set(NETWORK_ERROR.to_string());
                    }
                }

                *in_flight.borrow_mut() = false;
            });
        })
    };

    html! {
        <div class="max-w-2xl mx-auto py-8">
            <h1 class="text-3xl font-bold mb-6 text-center text-gray-900 dark:text-white">
                <span class="bg-clip-text text-transparent bg-gradient-to-r from-emerald-400 to-cyan-500">{"Daily Spin"}</span>
            </h1>

            <div class={styles::CARD}>
                <WheelDisc rotation={wheel.rotation_degrees} spinning={wheel.spinning} />

                if !(*error_message).is_empty() {
                    <div class="mt-6 text-center">
                        <p class="text-red-500 bg-red-50 dark:bg-red-900/20 p-3 rounded-lg">{&*error_message}</p>
                    </div>
                }

                <RewardDisplay outcome={(*outcome).clone()} />

                <div class="flex justify-center mt-8">
                    <div class="w-full max-w-[320px]">
                        if !*loading && !wheel.can_spin && *cooldown_seconds > 0 {
                            <div class="w-full bg-gray-200 dark:bg-gray-700 rounded-full h-2.5 mb-4">
                                <div class="bg-gradient-to-r from-emerald-500 to-cyan-600 h-2.5 rounded-full transition-all duration-500"
                                    style={format!("width: {}%", (1.0 - (*cooldown_seconds as f64 / SPIN_COOLDOWN_SECS as f64)) * 100.0)}>
                                </div>
                            </div>
                        }
                        <SpinButton
                            spinning={wheel.spinning}
                            can_spin={wheel.can_spin}
                            loading={*loading}
                            cooldown_message={wheel.cooldown_message.clone()}
                            onclick={start_spin}
                        />
                    </div>
                </div>

                <div class="mt-8 text-center bg-gray-50 dark:bg-gray-700/30 p-6 rounded-xl">
                    <p class={styles::TEXT_BODY}>
                        {"One free spin every 24 hours. Rewards land as TIV or USD."}
                    </p>
                    <p class="mt-2 text-sm text-gray-500 dark:text-gray-400">
                        {format!("Current streak: {} days", *streak)}
                        {
                            if *streak >= STREAK_DOUBLE_THRESHOLD {
                                " (rewards doubled!)"
                            } else {
                                ""
                            }
                        }
                    </p>
                    <p class="mt-1 text-xs text-gray-400 dark:text-gray-500">
                        {format!("Keep a {}-day streak to double every spin", STREAK_DOUBLE_THRESHOLD)}
                    </p>
                </div>
            </div>
        </div>
    }
}
