//! Agents Command
//!
//! List the roster with models and routing interests.

use crate::cli::Output;
use crate::config::ConfigLoader;
use crate::routing::InterestTable;
use crate::types::Result;

pub fn run() -> Result<()> {
    let out = Output::new();
    let config = ConfigLoader::load()?;
    let interests = InterestTable::defaults();

    out.header("Consultancy Roster");
    for profile in config.agent_profiles()? {
        out.section(&profile.name);
        out.field("Kind", profile.kind.as_str());
        out.field("Role", &profile.role_description);
        out.field(
            "Model",
            &format!("{} (temperature {})", profile.model, profile.temperature),
        );
        if profile.routable {
            if let Some(topics) = interests.get(profile.kind) {
                out.topics("Interests", topics);
            }
        } else {
            out.field("Interests", "receives no broadcasts");
        }
        for (idx, responsibility) in profile.responsibilities.iter().enumerate() {
            println!("    {}. {}", idx + 1, responsibility);
        }
    }
    Ok(())
}
