use yew::prelude::*;
use shared::constants::DOUBLED_QUALIFIER;
use shared::spin_wheel::SPIN_SETTLE_MS;

#[derive(Properties, PartialEq)]
pub struct WheelDiscProps {
    pub rotation: f64,
    pub spinning: bool,
}

/// The wheel itself: a fixed conic-gradient disc rotated by a CSS
/// transform. The segment under the pointer is decorative; the award comes
/// from the server, never from wheel geometry.
#[function_component(WheelDisc)]
pub fn wheel_disc(props: &WheelDiscProps) -> Html {
    let disc_style = format!(
        "transform: rotate({}deg); \
         transition: transform {}ms cubic-bezier(0.2, 0.85, 0.25, 1); \
         background: conic-gradient(\
            #10b981 0deg 90deg, \
            #06b6d4 90deg 180deg, \
            #8b5cf6 180deg 270deg, \
            #f59e0b 270deg 360deg);",
        props.rotation, SPIN_SETTLE_MS
    );

    let glow = if props.spinning {
        "filter: drop-shadow(0px 5px 20px rgba(16, 185, 129, 0.4));"
    } else {
        "filter: drop-shadow(0px 5px 15px rgba(0, 0, 0, 0.2));"
    };

    html! {
        <div class="relative w-full max-w-[360px] mx-auto" style={glow}>
            // Pointer
            <div class="absolute left-1/2 -translate-x-1/2 -top-2 z-10 w-0 h-0
                        border-l-[14px] border-l-transparent
                        border-r-[14px] border-r-transparent
                        border-t-[26px] border-t-amber-500"></div>
            <div
                class="w-full aspect-square rounded-full border-4 border-white dark:border-gray-700"
                style={disc_style}
            ></div>
            // Static hub on top of the rotating disc
            <div class="absolute inset-0 m-auto w-1/4 h-1/4 rounded-full bg-white dark:bg-gray-800
                        shadow-inner flex items-center justify-center">
                <span class="text-xs font-bold text-gray-500 dark:text-gray-300">{"TIV"}</span>
            </div>
        </div>
    }
}

#[derive(Clone, PartialEq)]
pub struct SpinOutcome {
    pub amount: i64,
    pub currency: String,
    pub doubled: bool,
}

#[derive(Properties, PartialEq)]
pub struct RewardDisplayProps {
    pub outcome: Option<SpinOutcome>,
}

#[function_component(RewardDisplay)]
pub fn reward_display(props: &RewardDisplayProps) -> Html {
    let outcome = match &props.outcome {
        Some(outcome) => outcome,
        None => return html! {},
    };

    let message = if outcome.doubled {
        format!("You won {} {}! {}", outcome.amount, outcome.currency, DOUBLED_QUALIFIER)
    } else {
        format!("You won {} {}!", outcome.amount, outcome.currency)
    };

    let gradient = if outcome.doubled {
        "from-amber-400 to-orange-500 border-amber-300"
    } else {
        "from-emerald-400 to-cyan-500 border-emerald-300"
    };

    html! {
        <div class="mt-6 flex justify-center">
            <div class={classes!(
                "px-6", "py-3", "rounded-xl", "bg-gradient-to-r", "text-white",
                "font-bold", "text-lg", "shadow-lg", "border-2", "animate-pulse",
                gradient
            )}>
                <span>{message}</span>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct SpinButtonProps {
    pub spinning: bool,
    pub can_spin: bool,
    pub loading: bool,
    pub cooldown_message: String,
    pub onclick: Callback<MouseEvent>,
}

#[function_component(SpinButton)]
pub fn spin_button(props: &SpinButtonProps) -> Html {
    let button_text = if props.loading {
        "Loading...".to_string()
    } else if props.spinning {
        "Spinning...".to_string()
    } else if !props.can_spin {
        props.cooldown_message.clone()
    } else {
        "Spin the wheel".to_string()
    };

    let is_disabled = props.loading || props.spinning || !props.can_spin;

    let button_class = if is_disabled {
        "w-full py-4 px-8 rounded-full font-bold text-lg text-white bg-gradient-to-r from-gray-400 to-gray-500 opacity-80 cursor-not-allowed"
    } else {
        "w-full py-4 px-8 rounded-full font-bold text-lg text-white bg-gradient-to-r from-emerald-500 to-cyan-600 hover:from-emerald-600 hover:to-cyan-700 shadow-lg hover:shadow-xl transform hover:-translate-y-0.5 transition-all duration-300"
    };

    html! {
        <button onclick={props.onclick.clone()} disabled={is_disabled} class={button_class}>
            <div class="flex items-center justify-center">
                if props.spinning {
                    <svg class="inline-block mr-2 animate-spin" xmlns="http://www.w3.org/2000/svg" width="20" height="20" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2">
                        <circle cx="12" cy="12" r="10" />
                        <path d="M12 6v6l4 2" />
                    </svg>
                }
                <span>{button_text}</span>
            </div>
        </button>
    }
}
