use yew::prelude::*;
use web_sys::HtmlInputElement;
use gloo_net::http::Request;
use wasm_bindgen_futures::spawn_local;
use shared::constants::NETWORK_ERROR;
use shared::marketplace::*;
use crate::config::get_api_base_url;
use crate::hooks::auth::use_auth;
use crate::hooks::use_tiv_balance::dispatch_tiv_balance;
use crate::styles;

#[function_component(Marketplace)]
pub fn marketplace() -> Html {
    let auth = use_auth();

    let listings = use_state(Vec::<TivListing>::new);
    let status_message = use_state(String::new);
    let error_message = use_state(String::new);
    let busy = use_state(|| false);
    let refresh_tick = use_state(|| 0u32);

    let sell_amount = use_state(String::new);
    let sell_price = use_state(String::new);
    let convert_amount = use_state(String::new);

    {
        let auth = auth.clone();
        let listings = listings.clone();
        let error_message = error_message.clone();

        use_effect_with(*refresh_tick, move |_| {
            spawn_local(async move {
                let result = Request::get(&format!("{}/api/marketplace/listings", get_api_base_url()))
                    .header("Authorization", &auth.bearer())
                    .send()
                    .await;

                match result {
                    Ok(resp) if resp.ok() => {
                        if let Ok(rows) = resp.json::<Vec<TivListing>>().await {
                            listings.set(rows);
                        }
                    }
                    _ => error_message.set("Failed to load listings".to_string()),
                }
            });
            || ()
        });
    }

    let buy = {
        let auth = auth.clone();
        let busy = busy.clone();
        let status_message = status_message.clone();
        let error_message = error_message.clone();
        let refresh_tick = refresh_tick.clone();

        Callback::from(move |listing_id: String| {
            if *busy {
                return;
            }
            busy.set(true);
            error_message.set(String::new());

            let auth = auth.clone();
            let busy = busy.clone();
            let status_message = status_message.clone();
            let error_message = error_message.clone();
            let refresh_tick = refresh_tick.clone();

            spawn_local(async move {
                let result = Request::post(&format!(
                    "{}/api/marketplace/listings/{}/buy",
                    get_api_base_url(),
                    listing_id
                ))
                .header("Authorization", &auth.bearer())
                .send()
                .await;

                match result {
                    Ok(resp) if resp.ok() => match resp.json::<BuyListingResponse>().await {
                        Ok(body) if body.success => {
                            dispatch_tiv_balance(body.new_tiv_balance);
                            status_message.set(body.message.unwrap_or_default());
                            refresh_tick.set(*refresh_tick + 1);
                        }
                        Ok(body) => error_message.set(body.message.unwrap_or_default()),
                        Err(_) => error_message.set("Failed to process purchase".to_string()),
                    },
                    Ok(_) => error_message.set("Failed to process purchase".to_string()),
                    Err(_) => error_message.set(NETWORK_ERROR.to_string()),
                }
                busy.set(false);
            });
        })
    };

    let create_listing = {
        let auth = auth.clone();
        let busy = busy.clone();
        let status_message = status_message.clone();
        let error_message = error_message.clone();
        let refresh_tick = refresh_tick.clone();
        let sell_amount = sell_amount.clone();
        let sell_price = sell_price.clone();

        Callback::from(move |_| {
            if *busy {
                return;
            }

            let tiv_amount = match sell_amount.parse::<i64>() {
                Ok(v) if v >= MIN_LISTING_TIV => v,
                _ => {
                    error_message.set(format!("Listings must be at least {} TIV", MIN_LISTING_TIV));
                    return;
                }
            };
            let price_usd_cents = match sell_price.parse::<i64>() {
                Ok(v) if v > 0 => v,
                _ => {
                    error_message.set("Enter a price in cents".to_string());
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
            let sell_amount = sell_amount.clone();
            let sell_price = sell_price.clone();

            spawn_local(async move {
                let payload = CreateListingRequest { tiv_amount, price_usd_cents };
                let result = Request::post(&format!("{}/api/marketplace/listings", get_api_base_url()))
                    .header("Content-Type", "application/json")
                    .header("Authorization", &auth.bearer())
                    .json(&payload)
                    .expect("Failed to build request")
                    .send()
                    .await;

                match result {
                    Ok(resp) if resp.ok() => {
                        match resp.json::<serde_json::Value>().await {
                            Ok(body) if body.get("success").and_then(|v| v.as_bool()) == Some(true) => {
                                status_message.set(format!(
                                    "Listed {} TIV ({} TIV fee applied)",
                                    tiv_amount, LISTING_FEE_TIV
                                ));
                                sell_amount.set(String::new());
                                sell_price.set(String::new());
                                refresh_tick.set(*refresh_tick + 1);
                            }
                            Ok(body) => error_message.set(
                                body.get("error")
                                    .and_then(|e| e.as_str())
                                    .unwrap_or("Failed to create listing")
                                    .to_string(),
                            ),
                            Err(_) => error_message.set("Failed to create listing".to_string()),
                        }
                    }
                    Ok(_) => error_message.set("Failed to create listing".to_string()),
                    Err(_) => error_message.set(NETWORK_ERROR.to_string()),
                }
                busy.set(false);
            });
        })
    };

    let convert = {
        let auth = auth.clone();
        let busy = busy.clone();
        let status_message = status_message.clone();
        let error_message = error_message.clone();
        let convert_amount = convert_amount.clone();

        Callback::from(move |_| {
            if *busy {
                return;
            }

            let tiv_amount = match convert_amount.parse::<i64>() {
                Ok(v) if v >= MIN_CONVERT_TIV => v,
                _ => {
                    error_message.set(format!("Conversions must be at least {} TIV", MIN_CONVERT_TIV));
                    return;
                }
            };

            busy.set(true);
            error_message.set(String::new());

            let auth = auth.clone();
            let busy = busy.clone();
            let status_message = status_message.clone();
            let error_message = error_message.clone();
            let convert_amount = convert_amount.clone();

            spawn_local(async move {
                let payload = ConvertRequest { tiv_amount };
                let result = Request::post(&format!("{}/api/convert", get_api_base_url()))
                    .header("Content-Type", "application/json")
                    .header("Authorization", &auth.bearer())
                    .json(&payload)
                    .expect("Failed to build request")
                    .send()
                    .await;

                match result {
                    Ok(resp) if resp.ok() => match resp.json::<ConvertResponse>().await {
                        Ok(body) if body.success => {
                            dispatch_tiv_balance(body.new_tiv_balance);
                            status_message.set(body.message.unwrap_or_default());
                            convert_amount.set(String::new());
                        }
                        Ok(body) => error_message.set(body.message.unwrap_or_default()),
                        Err(_) => error_message.set("Failed to convert".to_string()),
                    },
                    Ok(resp) if resp.status() == 403 => {
                        error_message.set("Identity verification is required before converting TIV".to_string());
                    }
                    Ok(_) => error_message.set("Failed to convert".to_string()),
                    Err(_) => error_message.set(NETWORK_ERROR.to_string()),
                }
                busy.set(false);
            });
        })
    };

    let on_sell_amount = {
        let sell_amount = sell_amount.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            sell_amount.set(input.value());
        })
    };
    let on_sell_price = {
        let sell_price = sell_price.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            sell_price.set(input.value());
        })
    };
    let on_convert_amount = {
        let convert_amount = convert_amount.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            convert_amount.set(input.value());
        })
    };

    html! {
        <div class="max-w-4xl mx-auto py-8 space-y-6">
            <h1 class={styles::TEXT_H1}>{"TIV Marketplace"}</h1>

            if !(*error_message).is_empty() {
                <div class={styles::CARD_ERROR}>{&*error_message}</div>
            }
            if !(*status_message).is_empty() {
                <div class={styles::CARD_SUCCESS}>{&*status_message}</div>
            }

            <div class={styles::CARD}>
                <h2 class={styles::TEXT_H2}>{"Open listings"}</h2>
                if listings.is_empty() {
                    <p class={classes!("mt-4", styles::TEXT_BODY)}>{"No TIV is listed right now."}</p>
                } else {
                    <table class={classes!("mt-4", styles::TABLE)}>
                        <thead>
                            <tr>
                                <th class={styles::TABLE_HEADER}>{"Seller"}</th>
                                <th class={styles::TABLE_HEADER}>{"Amount"}</th>
                                <th class={styles::TABLE_HEADER}>{"Price"}</th>
                                <th class={styles::TABLE_HEADER}></th>
                            </tr>
                        </thead>
                        <tbody>
                            { for listings.iter().map(|listing| {
                                let buy = buy.clone();
                                let id = listing.id.clone();
                                html! {
                                    <tr>
                                        <td class={styles::TABLE_CELL}>{&listing.seller_username}</td>
                                        <td class={styles::TABLE_CELL}>{format!("{} TIV", listing.tiv_amount)}</td>
                                        <td class={styles::TABLE_CELL}>{format!("${:.2}", listing.price_usd_cents as f64 / 100.0)}</td>
                                        <td class={styles::TABLE_CELL}>
                                            <button
                                                class={styles::BUTTON_PRIMARY}
                                                disabled={*busy}
                                                onclick={Callback::from(move |_| buy.emit(id.clone()))}
                                            >
                                                {"Buy"}
                                            </button>
                                        </td>
                                    </tr>
                                }
                            })}
                        </tbody>
                    </table>
                }
            </div>

            <div class="grid grid-cols-1 md:grid-cols-2 gap-6">
                <div class={styles::CARD}>
                    <h2 class={styles::TEXT_H2}>{"Sell TIV"}</h2>
                    <label class={classes!("mt-4", styles::TEXT_LABEL)}>{"Amount (TIV)"}</label>
                    <input class={styles::INPUT} type="number" value={(*sell_amount).clone()} oninput={on_sell_amount} />
                    <label class={classes!("mt-4", styles::TEXT_LABEL)}>{"Price (US cents)"}</label>
                    <input class={styles::INPUT} type="number" value={(*sell_price).clone()} oninput={on_sell_price} />
                    <button class={classes!("mt-4", styles::BUTTON_PRIMARY)} disabled={*busy} onclick={create_listing}>
                        {"List for sale"}
                    </button>
                    <p class={classes!("mt-2", styles::TEXT_SMALL)}>
                        {format!("A flat {} TIV fee applies. Listed TIV is held until the lot sells or is cancelled.", LISTING_FEE_TIV)}
                    </p>
                </div>

                <div class={styles::CARD}>
                    <h2 class={styles::TEXT_H2}>{"Convert to USD"}</h2>
                    <label class={classes!("mt-4", styles::TEXT_LABEL)}>{"Amount (TIV)"}</label>
                    <input class={styles::INPUT} type="number" value={(*convert_amount).clone()} oninput={on_convert_amount} />
                    <button class={classes!("mt-4", styles::BUTTON_PRIMARY)} disabled={*busy} onclick={convert}>
                        {"Convert"}
                    </button>
                    <p class={classes!("mt-2", styles::TEXT_SMALL)}>
                        {format!("1 TIV = {}¢. Minimum {} TIV. Verified accounts only.", TIV_CENT_RATE, MIN_CONVERT_TIV)}
                    </p>
                </div>
            </div>
        </div>
    }
}
