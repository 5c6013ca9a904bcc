use web_sys::window;

pub fn get_api_base_url() -> String {
    // Relative URLs on the production domain, absolute ones in development
    if let Some(window) = window() {
        if let Ok(location) = window.location().host() {
            if location.contains("tivrewards.app") {
                return "".to_string();
            }

            // Use the current hostname and port so the app works when
            // accessed from other machines on the network
            let protocol = window.location().protocol().unwrap_or_else(|_| "http:".to_string());
            return format!("{}//{}", protocol, location);
        }
    }

    // Default to 127.0.0.1 for development
    "http://127.0.0.1:3000".to_string()
}
