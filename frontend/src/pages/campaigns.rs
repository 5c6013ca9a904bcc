use yew::prelude::*;
use web_sys::HtmlInputElement;
use gloo_net::http::Request;
use gloo_timers::callback::Interval;
use wasm_bindgen_futures::spawn_local;
use shared::constants::NETWORK_ERROR;
use shared::campaign::*;
use crate::config::get_api_base_url;
use crate::hooks::auth::use_auth;
use crate::hooks::use_tiv_balance::dispatch_tiv_balance;
use crate::pages::quiz::QuizPanel;
use crate::styles;

/// A view session handed out by the participate endpoint. Held client-side
/// only while the video is open.
#[derive(Clone, PartialEq)]
struct ActiveView {
    campaign_id: String,
    campaign_title: String,
    view_token: String,
}

#[function_component(Campaigns)]
pub fn campaigns() -> Html {
    let auth = use_auth();

    let campaigns = use_state(Vec::<CampaignSummary>::new);
    let active_view = use_state(|| None::<ActiveView>);
    let watch_remaining = use_state(|| 0u64);
    let quiz_campaign = use_state(|| None::<String>);
    let busy = use_state(|| false);
    let status_message = use_state(String::new);
    let error_message = use_state(String::new);
    let refresh_tick = use_state(|| 0u32);

    let title = use_state(String::new);
    let video_url = use_state(String::new);
    let reward_per_view = use_state(String::new);
    let budget = use_state(String::new);

    {
        let auth = auth.clone();
        let campaigns = campaigns.clone();
        let error_message = error_message.clone();

        use_effect_with(*refresh_tick, move |_| {
            spawn_local(async move {
                let result = Request::get(&format!("{}/api/campaigns", get_api_base_url()))
                    .header("Authorization", &auth.bearer())
                    .send()
                    .await;

                match result {
                    Ok(resp) if resp.ok() => {
                        if let Ok(rows) = resp.json::<Vec<CampaignSummary>>().await {
                            campaigns.set(rows);
                        }
                    }
                    _ => error_message.set("Failed to load campaigns".to_string()),
                }
            });
            || ()
        });
    }

    // Minimum-watch countdown for the open view session.
    {
        let watch_remaining = watch_remaining.clone();

        use_effect_with(*watch_remaining, move |remaining| {
            if *remaining == 0 {
                return Box::new(|| ()) as Box<dyn FnOnce()>;
            }
            let remaining = *remaining;
            let interval = Interval::new(1000, move || {
                watch_remaining.set(remaining.saturating_sub(1));
            });
            Box::new(move || drop(interval)) as Box<dyn FnOnce()>
        });
    }

    let participate = {
        let auth = auth.clone();
        let busy = busy.clone();
        let active_view = active_view.clone();
        let watch_remaining = watch_remaining.clone();
        let error_message = error_message.clone();
        let status_message = status_message.clone();

        Callback::from(move |(campaign_id, campaign_title): (String, String)| {
            if *busy || active_view.is_some() {
                return;
            }
            busy.set(true);
            error_message.set(String::new());

            let auth = auth.clone();
            let busy = busy.clone();
            let active_view = active_view.clone();
            let watch_remaining = watch_remaining.clone();
            let error_message = error_message.clone();
            let status_message = status_message.clone();

            spawn_local(async move {
                let result = Request::post(&format!(
                    "{}/api/campaigns/{}/participate",
                    get_api_base_url(),
                    campaign_id
                ))
                .header("Authorization", &auth.bearer())
                .send()
                .await;

                match result {
                    Ok(resp) if resp.ok() => match resp.json::<ParticipateResponse>().await {
                        Ok(body) if body.success => {
                            if let Some(token) = body.view_token {
                                watch_remaining.set(body.min_watch_secs);
                                active_view.set(Some(ActiveView {
                                    campaign_id,
                                    campaign_title,
                                    view_token: token,
                                }));
                                status_message.set(String::new());
                            }
                        }
                        Ok(body) => error_message.set(body.message.unwrap_or_default()),
                        Err(_) => error_message.set("Failed to join campaign".to_string()),
                    },
                    Ok(_) => error_message.set("Failed to join campaign".to_string()),
                    Err(_) => error_message.set(NETWORK_ERROR.to_string()),
                }
                busy.set(false);
            });
        })
    };

    let complete_view = {
        let auth = auth.clone();
        let busy = busy.clone();
        let active_view = active_view.clone();
        let error_message = error_message.clone();
        let status_message = status_message.clone();
        let refresh_tick = refresh_tick.clone();

        Callback::from(move |_| {
            let view = match &*active_view {
                Some(view) => view.clone(),
                None => return,
            };
            if *busy {
                return;
            }
            busy.set(true);
            error_message.set(String::new());

            let auth = auth.clone();
            let busy = busy.clone();
            let active_view = active_view.clone();
            let error_message = error_message.clone();
            let status_message = status_message.clone();
            let refresh_tick = refresh_tick.clone();

            spawn_local(async move {
                let payload = CompleteViewRequest {
                    view_token: view.view_token.clone(),
                    timestamp: js_sys::Date::now() as u64,
                };
                let result = Request::post(&format!(
                    "{}/api/campaigns/{}/complete",
                    get_api_base_url(),
                    view.campaign_id
                ))
                .header("Content-Type", "application/json")
                .header("Authorization", &auth.bearer())
                .json(&payload)
                .expect("Failed to build request")
                .send()
                .await;

                match result {
                    Ok(resp) if resp.ok() => match resp.json::<CompleteViewResponse>().await {
                        Ok(body) if body.success => {
                            dispatch_tiv_balance(body.new_tiv_balance);
                            status_message.set(body.message.unwrap_or_default());
                            active_view.set(None);
                            refresh_tick.set(*refresh_tick + 1);
                        }
                        Ok(body) => error_message.set(body.message.unwrap_or_default()),
                        Err(_) => error_message.set("Failed to credit the view".to_string()),
                    },
                    Ok(_) => error_message.set("Failed to credit the view".to_string()),
                    Err(_) => error_message.set(NETWORK_ERROR.to_string()),
                }
                busy.set(false);
            });
        })
    };

    let create_campaign = {
        let auth = auth.clone();
        let busy = busy.clone();
        let error_message = error_message.clone();
        let status_message = status_message.clone();
        let refresh_tick = refresh_tick.clone();
        let title = title.clone();
        let video_url = video_url.clone();
        let reward_per_view = reward_per_view.clone();
        let budget = budget.clone();

        Callback::from(move |_| {
            if *busy {
                return;
            }

            let payload = CreateCampaignRequest {
                title: (*title).clone(),
                video_url: (*video_url).clone(),
                reward_per_view: reward_per_view.parse().unwrap_or(0),
                budget_tiv: budget.parse().unwrap_or(0),
            };

            busy.set(true);
            error_message.set(String::new());

            let auth = auth.clone();
            let busy = busy.clone();
            let error_message = error_message.clone();
            let status_message = status_message.clone();
            let refresh_tick = refresh_tick.clone();
            let title = title.clone();
            let video_url = video_url.clone();
            let reward_per_view = reward_per_view.clone();
            let budget = budget.clone();

            spawn_local(async move {
                let result = Request::post(&format!("{}/api/campaigns", get_api_base_url()))
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
                                status_message.set("Campaign funded".to_string());
                                title.set(String::new());
                                video_url.set(String::new());
                                reward_per_view.set(String::new());
                                budget.set(String::new());
                                refresh_tick.set(*refresh_tick + 1);
                            }
                            Ok(body) => error_message.set(
                                body.get("error")
                                    .and_then(|e| e.as_str())
                                    .unwrap_or("Failed to create campaign")
                                    .to_string(),
                            ),
                            Err(_) => error_message.set("Failed to create campaign".to_string()),
                        }
                    }
                    Ok(resp) if resp.status() == 403 => {
                        error_message.set("Only creator accounts can fund campaigns".to_string());
                    }
                    Ok(resp) => {
                        let message = resp
                            .json::<serde_json::Value>()
                            .await
                            .ok()
                            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                            .unwrap_or_else(|| "Failed to create campaign".to_string());
                        error_message.set(message);
                    }
                    Err(_) => error_message.set(NETWORK_ERROR.to_string()),
                }
                busy.set(false);
            });
        })
    };

    let text_input = |handle: UseStateHandle<String>| {
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            handle.set(input.value());
        })
    };

    if let Some(campaign_id) = (*quiz_campaign).clone() {
        let quiz_campaign = quiz_campaign.clone();
        return html! {
            <QuizPanel
                campaign_id={campaign_id}
                on_close={Callback::from(move |_| quiz_campaign.set(None))}
            />
        };
    }

    html! {
        <div class="max-w-4xl mx-auto py-8 space-y-6">
            <h1 class={styles::TEXT_H1}>{"Video Campaigns"}</h1>

            if !(*error_message).is_empty() {
                <div class={styles::CARD_ERROR}>{&*error_message}</div>
            }
            if !(*status_message).is_empty() {
                <div class={styles::CARD_SUCCESS}>{&*status_message}</div>
            }

            if let Some(view) = &*active_view {
                <div class={styles::CARD}>
                    <h2 class={styles::TEXT_H2}>{format!("Watching: {}", view.campaign_title)}</h2>
                    if *watch_remaining > 0 {
                        <p class={classes!("mt-3", styles::TEXT_BODY)}>
                            {format!("Keep the video open — creditable in {}s", *watch_remaining)}
                        </p>
                    } else {
                        <button class={classes!("mt-3", styles::BUTTON_PRIMARY)} disabled={*busy} onclick={complete_view}>
                            {"Claim view reward"}
                        </button>
                    }
                </div>
            }

            <div class="grid grid-cols-1 md:grid-cols-2 gap-6">
                { for campaigns.iter().map(|campaign| {
                    let participate = participate.clone();
                    let quiz_campaign = quiz_campaign.clone();
                    let id = campaign.id.clone();
                    let quiz_id = campaign.id.clone();
                    let campaign_title = campaign.title.clone();
                    let watching = active_view.is_some();
                    html! {
                        <div class={styles::CARD}>
                            <h3 class="text-lg font-semibold text-gray-900 dark:text-white">{&campaign.title}</h3>
                            <p class={classes!("mt-1", styles::TEXT_SMALL)}>
                                {format!("by {} · {} TIV per view · {} TIV left", campaign.creator_username, campaign.reward_per_view, campaign.remaining_tiv)}
                            </p>
                            <div class="mt-4 flex items-center space-x-3">
                                <a href={campaign.video_url.clone()} target="_blank" class={styles::BUTTON_SECONDARY}>
                                    {"Open video"}
                                </a>
                                <button
                                    class={styles::BUTTON_PRIMARY}
                                    disabled={watching}
                                    onclick={Callback::from(move |_| participate.emit((id.clone(), campaign_title.clone())))}
                                >
                                    {"Start view"}
                                </button>
                                if campaign.has_quiz {
                                    <button
                                        class={styles::BUTTON_SECONDARY}
                                        onclick={Callback::from(move |_| quiz_campaign.set(Some(quiz_id.clone())))}
                                    >
                                        {"Take quiz"}
                                    </button>
                                }
                            </div>
                        </div>
                    }
                })}
            </div>

            <div class={styles::CARD}>
                <h2 class={styles::TEXT_H2}>{"Fund a campaign"}</h2>
                <label class={classes!("mt-4", styles::TEXT_LABEL)}>{"Title"}</label>
                <input class={styles::INPUT} value={(*title).clone()} oninput={text_input(title.clone())} />
                <label class={classes!("mt-4", styles::TEXT_LABEL)}>{"Video URL"}</label>
                <input class={styles::INPUT} value={(*video_url).clone()} oninput={text_input(video_url.clone())} />
                <div class="grid grid-cols-2 gap-4">
                    <div>
                        <label class={classes!("mt-4", styles::TEXT_LABEL)}>{"Reward per view (TIV)"}</label>
                        <input class={styles::INPUT} type="number" value={(*reward_per_view).clone()} oninput={text_input(reward_per_view.clone())} />
                    </div>
                    <div>
                        <label class={classes!("mt-4", styles::TEXT_LABEL)}>{"Budget (TIV)"}</label>
                        <input class={styles::INPUT} type="number" value={(*budget).clone()} oninput={text_input(budget.clone())} />
                    </div>
                </div>
                <button class={classes!("mt-4", styles::BUTTON_PRIMARY)} disabled={*busy} onclick={create_campaign}>
                    {"Fund campaign"}
                </button>
                <p class={classes!("mt-2", styles::TEXT_SMALL)}>
                    {"The budget is escrowed from your TIV balance up front. Creator accounts only."}
                </p>
            </div>
        </div>
    }
}
