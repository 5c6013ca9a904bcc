use yew::prelude::*;
use web_sys::HtmlInputElement;
use gloo_net::http::Request;
use wasm_bindgen_futures::spawn_local;
use shared::constants::NETWORK_ERROR;
use shared::pool::*;
use crate::config::get_api_base_url;
use crate::hooks::auth::use_auth;
use crate::hooks::use_tiv_balance::dispatch_tiv_balance;
use crate::styles;

#[function_component(Pools)]
pub fn pools() -> Html {
    let auth = use_auth();

    let pools = use_state(Vec::<PoolSummary>::new);
    let amount = use_state(String::new);
    let busy = use_state(|| false);
    let status_message = use_state(String::new);
    let error_message = use_state(String::new);
    let refresh_tick = use_state(|| 0u32);

    {
        let auth = auth.clone();
        let pools = pools.clone();
        let error_message = error_message.clone();

        use_effect_with(*refresh_tick, move |_| {
            spawn_local(async move {
                let result = Request::get(&format!("{}/api/pools", get_api_base_url()))
                    .header("Authorization", &auth.bearer())
                    .send()
                    .await;

                match result {
                    Ok(resp) if resp.ok() => {
                        if let Ok(rows) = resp.json::<Vec<PoolSummary>>().await {
                            pools.set(rows);
                        }
                    }
                    _ => error_message.set("Failed to load pools".to_string()),
                }
            });
            || ()
        });
    }

    let join = {
        let auth = auth.clone();
        let amount = amount.clone();
        let busy = busy.clone();
        let status_message = status_message.clone();
        let error_message = error_message.clone();
        let refresh_tick = refresh_tick.clone();

        Callback::from(move |pool_id: String| {
            if *busy {
                return;
            }
            let amount_tiv = match amount.parse::<i64>() {
                Ok(v) if v >= MIN_POOL_CONTRIBUTION_TIV => v,
                _ => {
                    error_message.set(format!(
                        "Contributions must be at least {} TIV",
                        MIN_POOL_CONTRIBUTION_TIV
                    ));
                    return;
                }
            };

            busy.set(true);
            error_message.set(String::new());

            let auth = auth.clone();
            let busy = busy.clone();
            let status_message = status_message.clone();
            let error_message = error_message.clone();
            let refresh_tick = refresh_tick.clone();

            spawn_local(async move {
                let payload = JoinPoolRequest { amount_tiv };
                let result = Request::post(&format!("{}/api/pools/{}/join", get_api_base_url(), pool_id))
                    .header("Content-Type", "application/json")
                    .header("Authorization", &auth.bearer())
                    .json(&payload)
                    .expect("Failed to build request")
                    .send()
                    .await;

                match result {
                    Ok(resp) if resp.ok() => match resp.json::<JoinPoolResponse>().await {
                        Ok(body) if body.success => {
                            dispatch_tiv_balance(body.new_tiv_balance);
                            status_message.set(body.message.unwrap_or_default());
                            refresh_tick.set(*refresh_tick + 1);
                        }
                        Ok(body) => error_message.set(body.message.unwrap_or_default()),
                        Err(_) => error_message.set("Failed to contribute".to_string()),
                    },
                    Ok(_) => error_message.set("Failed to contribute".to_string()),
                    Err(_) => error_message.set(NETWORK_ERROR.to_string()),
                }
                busy.set(false);
            });
        })
    };

    let on_amount = {
        let amount = amount.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            amount.set(input.value());
        })
    };

    html! {
        <div class="max-w-4xl mx-auto py-8 space-y-6">
            <h1 class={styles::TEXT_H1}>{"Investment Pools"}</h1>

            if !(*error_message).is_empty() {
                <div class={styles::CARD_ERROR}>{&*error_message}</div>
            }
            if !(*status_message).is_empty() {
                <div class={styles::CARD_SUCCESS}>{&*status_message}</div>
            }

            <div class={styles::CARD}>
                <label class={styles::TEXT_LABEL}>{"Contribution amount (TIV)"}</label>
                <input class={styles::INPUT} type="number" value={(*amount).clone()} oninput={on_amount} />
                <p class={classes!("mt-2", styles::TEXT_SMALL)}>
                    {format!("Minimum {} TIV per contribution.", MIN_POOL_CONTRIBUTION_TIV)}
                </p>
            </div>

            <div class="grid grid-cols-1 md:grid-cols-2 gap-6">
                { for pools.iter().map(|pool| {
                    let join = join.clone();
                    let id = pool.id.clone();
                    let open = pool.status == "open";
                    let progress = if pool.target_tiv > 0 {
                        (pool.contributed_tiv as f64 / pool.target_tiv as f64 * 100.0).min(100.0)
                    } else {
                        0.0
                    };
                    html! {
                        <div class={styles::CARD}>
                            <h3 class="text-lg font-semibold text-gray-900 dark:text-white">{&pool.name}</h3>
                            <p class={classes!("mt-1", styles::TEXT_SMALL)}>
                                {format!("{} / {} TIV from {} contributors", pool.contributed_tiv, pool.target_tiv, pool.contributor_count)}
                            </p>
                            <div class="mt-3 w-full bg-gray-200 dark:bg-gray-700 rounded-full h-2.5">
                                <div class="bg-gradient-to-r from-emerald-500 to-cyan-600 h-2.5 rounded-full"
                                    style={format!("width: {}%", progress)}>
                                </div>
                            </div>
                            <button
                                class={classes!("mt-4", styles::BUTTON_PRIMARY)}
                                disabled={*busy || !open}
                                onclick={Callback::from(move |_| join.emit(id.clone()))}
                            >
                                { if open { "Contribute" } else { "Fully funded" } }
                            </button>
                        </div>
                    }
                })}
            </div>
        </div>
    }
}
