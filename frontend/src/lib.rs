pub mod styles;
pub mod hooks;
pub mod pages;
pub mod config;

use std::rc::Rc;
use yew::prelude::*;
use crate::hooks::auth::AuthContext;
use crate::hooks::use_tiv_balance::use_tiv_balance;
use crate::pages::{
    spin_wheel::SpinWheel,
    campaigns::Campaigns,
    marketplace::Marketplace,
    pools::Pools,
};

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Spin,
    Campaigns,
    Marketplace,
    Pools,
}

impl Section {
    fn label(&self) -> &'static str {
        match self {
            Self::Spin => "Daily Spin",
            Self::Campaigns => "Campaigns",
            Self::Marketplace => "Marketplace",
            Self::Pools => "Pools",
        }
    }
}

const SECTIONS: [Section; 4] = [
    Section::Spin,
    Section::Campaigns,
    Section::Marketplace,
    Section::Pools,
];

#[function_component(App)]
pub fn app() -> Html {
    let auth = use_memo((), |_| AuthContext::load());
    let section = use_state(|| Section::Spin);

    html! {
        <ContextProvider<Rc<AuthContext>> context={Rc::clone(&auth)}>
            <div class={styles::CONTAINER}>
                <Shell section={*section} on_select={{
                    let section = section.clone();
                    Callback::from(move |s| section.set(s))
                }} />
            </div>
        </ContextProvider<Rc<AuthContext>>>
    }
}

#[derive(Properties, PartialEq)]
struct ShellProps {
    section: Section,
    on_select: Callback<Section>,
}

#[function_component(Shell)]
fn shell(props: &ShellProps) -> Html {
    let balance = use_tiv_balance();

    html! {
        <>
            <nav class={styles::NAV}>
                <div class={styles::NAV_INNER}>
                    <span class={styles::NAV_BRAND}>{"TIV Rewards"}</span>
                    <div class="flex items-center space-x-2">
                        { for SECTIONS.iter().map(|s| {
                            let on_select = props.on_select.clone();
                            let target = *s;
                            let class = if props.section == target {
                                styles::NAV_TAB_ACTIVE
                            } else {
                                styles::NAV_TAB
                            };
                            html! {
                                <button {class} onclick={Callback::from(move |_| on_select.emit(target))}>
                                    {target.label()}
                                </button>
                            }
                        })}
                        <span class={styles::BALANCE_PILL}>{format!("{} TIV", *balance)}</span>
                    </div>
                </div>
            </nav>
            <main>
                {
                    match props.section {
                        Section::Spin => html! { <SpinWheel /> },
                        Section::Campaigns => html! { <Campaigns /> },
                        Section::Marketplace => html! { <Marketplace /> },
                        Section::Pools => html! { <Pools /> },
                    }
                }
            </main>
        </>
    }
}
