use yew::prelude::*;
use gloo_net::http::Request;
use wasm_bindgen_futures::spawn_local;
use shared::constants::NETWORK_ERROR;
use shared::campaign::*;
use crate::config::get_api_base_url;
use crate::hooks::auth::use_auth;
use crate::hooks::use_tiv_balance::dispatch_tiv_balance;
use crate::styles;

#[derive(Properties, PartialEq)]
pub struct QuizPanelProps {
    pub campaign_id: String,
    pub on_close: Callback<()>,
}

#[function_component(QuizPanel)]
pub fn quiz_panel(props: &QuizPanelProps) -> Html {
    let auth = use_auth();

    let quiz = use_state(|| None::<QuizPublic>);
    let answers = use_state(Vec::<i16>::new);
    let result = use_state(|| None::<QuizResultResponse>);
    let busy = use_state(|| false);
    let error_message = use_state(String::new);

    {
        let auth = auth.clone();
        let quiz = quiz.clone();
        let answers = answers.clone();
        let error_message = error_message.clone();
        let campaign_id = props.campaign_id.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                let response = Request::get(&format!(
                    "{}/api/campaigns/{}/quiz",
                    get_api_base_url(),
                    campaign_id
                ))
                .header("Authorization", &auth.bearer())
                .send()
                .await;

                match response {
                    Ok(resp) if resp.ok() => match resp.json::<QuizPublic>().await {
                        Ok(body) => {
                            answers.set(vec![-1; body.questions.len()]);
                            quiz.set(Some(body));
                        }
                        Err(_) => error_message.set("Failed to load the quiz".to_string()),
                    },
                    Ok(resp) if resp.status() == 404 => {
                        error_message.set("This campaign has no quiz".to_string());
                    }
                    Ok(_) => error_message.set("Failed to load the quiz".to_string()),
                    Err(_) => error_message.set(NETWORK_ERROR.to_string()),
                }
            });
            || ()
        });
    }

    let select_answer = {
        let answers = answers.clone();
        Callback::from(move |(question_index, option_index): (usize, i16)| {
            let mut next = (*answers).clone();
            if question_index < next.len() {
                next[question_index] = option_index;
                answers.set(next);
            }
        })
    };

    let submit = {
        let auth = auth.clone();
        let quiz = quiz.clone();
        let answers = answers.clone();
        let result = result.clone();
        let busy = busy.clone();
        let error_message = error_message.clone();

        Callback::from(move |_| {
            let quiz_id = match &*quiz {
                Some(quiz) => quiz.id.clone(),
                None => return,
            };
            if *busy || result.is_some() {
                return;
            }
            if answers.iter().any(|&a| a < 0) {
                error_message.set("Answer every question before submitting".to_string());
                return;
            }

            busy.set(true);
            error_message.set(String::new());

            let auth = auth.clone();
            let answers = answers.clone();
            let result = result.clone();
            let busy = busy.clone();
            let error_message = error_message.clone();

            spawn_local(async move {
                let payload = SubmitQuizRequest { answers: (*answers).clone() };
                let response = Request::post(&format!(
                    "{}/api/quizzes/{}/submit",
                    get_api_base_url(),
                    quiz_id
                ))
                .header("Content-Type", "application/json")
                .header("Authorization", &auth.bearer())
                .json(&payload)
                .expect("Failed to build request")
                .send()
                .await;

                match response {
                    Ok(resp) if resp.ok() => match resp.json::<QuizResultResponse>().await {
                        Ok(body) if body.success => {
                            if body.passed {
                                dispatch_tiv_balance(body.new_tiv_balance);
                            }
                            result.set(Some(body));
                        }
                        Ok(body) => error_message.set(body.message.unwrap_or_default()),
                        Err(_) => error_message.set("Failed to submit answers".to_string()),
                    },
                    Ok(_) => error_message.set("Failed to submit answers".to_string()),
                    Err(_) => error_message.set(NETWORK_ERROR.to_string()),
                }
                busy.set(false);
            });
        })
    };

    let close = {
        let on_close = props.on_close.clone();
        Callback::from(move |_| on_close.emit(()))
    };

    html! {
        <div class="max-w-2xl mx-auto py-8 space-y-6">
            <div class="flex items-center justify-between">
                <h1 class={styles::TEXT_H1}>{"Campaign quiz"}</h1>
                <button class={styles::BUTTON_SECONDARY} onclick={close}>{"Back to campaigns"}</button>
            </div>

            if !(*error_message).is_empty() {
                <div class={styles::CARD_ERROR}>{&*error_message}</div>
            }

            if let Some(result) = &*result {
                <div class={if result.passed { styles::CARD_SUCCESS } else { styles::CARD_ERROR }}>
                    <p class="font-semibold">
                        {result.message.clone().unwrap_or_default()}
                    </p>
                    <p class="mt-1 text-sm">
                        {format!("{} of {} correct", result.correct, result.total)}
                    </p>
                </div>
            } else if let Some(quiz) = &*quiz {
                <div class={styles::CARD}>
                    <h2 class={styles::TEXT_H2}>{&quiz.title}</h2>
                    <p class={classes!("mt-1", styles::TEXT_SMALL)}>
                        {format!("Score {}% or better to earn {} TIV", QUIZ_PASS_PERCENT, quiz.reward_tiv)}
                    </p>

                    { for quiz.questions.iter().enumerate().map(|(question_index, question)| {
                        let selected = answers.get(question_index).copied().unwrap_or(-1);
                        html! {
                            <div class="mt-6">
                                <p class="font-medium text-gray-900 dark:text-white">
                                    {format!("{}. {}", question_index + 1, question.prompt)}
                                </p>
                                <div class="mt-2 space-y-2">
                                    { for question.options.iter().enumerate().map(|(option_index, option)| {
                                        let select_answer = select_answer.clone();
                                        let option_index = option_index as i16;
                                        let checked = selected == option_index;
                                        html! {
                                            <label class="flex items-center space-x-2 text-gray-700 dark:text-gray-300 cursor-pointer">
                                                <input
                                                    type="radio"
                                                    name={format!("question-{}", question_index)}
                                                    checked={checked}
                                                    onchange={Callback::from(move |_| select_answer.emit((question_index, option_index)))}
                                                />
                                                <span>{option}</span>
                                            </label>
                                        }
                                    })}
                                </div>
                            </div>
                        }
                    })}

                    <button class={classes!("mt-6", styles::BUTTON_PRIMARY)} disabled={*busy} onclick={submit}>
                        {"Submit answers"}
                    </button>
                </div>
            } else {
                <div class="flex justify-center">
                    <div class={styles::LOADING_SPINNER}></div>
                </div>
            }
        </div>
    }
}
