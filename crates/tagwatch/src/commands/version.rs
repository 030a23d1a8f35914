//! Version command

use crate::cli::VersionArgs;
use crate::version::VersionInfo;
use anyhow::Result;

pub fn run(args: VersionArgs) -> Result<()> {
    let info = VersionInfo::current();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", info.display());
        if let Some(commit) = &info.commit {
            println!("Commit:     {}", commit);
        }
        if let Some(target) = &info.target {
            println!("Target:     {}", target);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info_display_contains_version() {
        let info = VersionInfo::current();
        let display = info.display();
        assert!(display.starts_with("tagwatch "));
        assert!(display.contains(&info.version));
    }

    #[test]
    fn test_version_info_serializes() {
        let json = serde_json::to_value(VersionInfo::current()).unwrap();
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert!(json["engine"].is_string());
    }
}
