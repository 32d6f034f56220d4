pub mod chat;

pub mod settings {
    use serde::{Deserialize, Serialize};

    fn default_timeout_secs() -> u64 {
        30
    }

    fn default_greeting() -> Option<String> {
        Some(
            "Hi! I'm the **WalletX** assistant. Ask me about security, fees, \
             supported assets or getting started."
                .to_string(),
        )
    }

    fn default_breakpoint() -> f32 {
        640.0
    }

    /// Sampling parameters sent with every generation request
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct GenerationSettings {
        pub temperature: f32,
        pub top_k: u32,
        pub top_p: f32,
        pub max_output_tokens: u32,
    }

    impl Default for GenerationSettings {
        fn default() -> Self {
            Self {
                temperature: 0.7,
                top_k: 40,
                top_p: 0.95,
                max_output_tokens: 1024,
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AssistantSettings {
        /// Full generate-content URL, e.g.
        /// `https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent`
        pub endpoint: Option<String>,
        pub api_key: Option<String>,
        #[serde(default = "default_timeout_secs")]
        pub request_timeout_secs: u64,
        #[serde(default)]
        pub generation: GenerationSettings,
    }

    impl Default for AssistantSettings {
        fn default() -> Self {
            Self {
                endpoint: None,
                api_key: None,
                request_timeout_secs: default_timeout_secs(),
                generation: GenerationSettings::default(),
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct WidgetSettings {
        /// Assistant message shown when a conversation starts; `None` disables it
        #[serde(default = "default_greeting")]
        pub greeting: Option<String>,
        /// Viewports narrower than this (logical px) get the full-screen layout
        #[serde(default = "default_breakpoint")]
        pub compact_min_width: f32,
    }

    impl Default for WidgetSettings {
        fn default() -> Self {
            Self {
                greeting: default_greeting(),
                compact_min_width: default_breakpoint(),
            }
        }
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct AppSettings {
        #[serde(default)]
        pub assistant: AssistantSettings,
        #[serde(default)]
        pub widget: WidgetSettings,
    }
}
