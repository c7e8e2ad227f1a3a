//! `$STAGEHAND_*` substitution in the backend command line.

use super::Launch;
use rustc_hash::FxHashMap;

/// Spliced into one argument per selected module.
const MODULES_VAR: &str = "$STAGEHAND_MODULES";
/// Spliced into one argument per live source root.
const SOURCE_ROOTS_VAR: &str = "$STAGEHAND_SOURCE_ROOTS";

/// Build `$STAGEHAND_*` variables for a launch. Also exported to the child.
pub fn launch_vars(launch: &Launch) -> FxHashMap<String, String> {
    let mut vars = FxHashMap::default();
    vars.insert(
        "STAGEHAND_WORK_DIR".into(),
        launch.work_dir.display().to_string(),
    );
    vars.insert(
        "STAGEHAND_STAGING_ROOT".into(),
        launch.staging_root.display().to_string(),
    );
    vars.insert("STAGEHAND_BIND_ADDRESS".into(), launch.bind_address.clone());
    vars.insert("STAGEHAND_PORT".into(), launch.port.to_string());
    vars
}

/// Resolve variables in command arguments.
///
/// - `$LIST` alone expands to one argument per item.
/// - `<flag>=$LIST` repeats the flag before each item:
///   `-src=$STAGEHAND_SOURCE_ROOTS` becomes `-src a -src b`.
/// - Scalar variables are replaced wherever they occur.
pub fn resolve_args(
    args: &[String],
    vars: &FxHashMap<String, String>,
    launch: &Launch,
) -> Vec<String> {
    let mut resolved = Vec::with_capacity(args.len());
    for arg in args {
        if let Some(items) = list_items(arg, launch) {
            resolved.extend(items);
            continue;
        }
        if let Some((flag, var)) = arg.split_once('=')
            && !flag.is_empty()
            && let Some(items) = list_items(var, launch)
        {
            for item in items {
                resolved.push(flag.to_string());
                resolved.push(item);
            }
            continue;
        }

        let mut result = arg.clone();
        for (key, value) in vars {
            result = result.replace(&format!("${key}"), value);
        }
        resolved.push(result);
    }
    resolved
}

/// Items of the list variable `name`, if it is one.
fn list_items(name: &str, launch: &Launch) -> Option<Vec<String>> {
    match name {
        MODULES_VAR => Some(launch.modules.clone()),
        SOURCE_ROOTS_VAR => Some(
            launch
                .source_roots
                .iter()
                .map(|root| root.display().to_string())
                .collect(),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn launch() -> Launch {
        Launch {
            work_dir: PathBuf::from("/p/target/stagehand/work"),
            staging_root: PathBuf::from("/p/target/classes"),
            source_roots: vec![
                PathBuf::from("/p/src/main/java"),
                PathBuf::from("/p/target/classes"),
            ],
            modules: vec!["com.example.App".into(), "com.example.Admin".into()],
            bind_address: "127.0.0.1".into(),
            port: 9876,
        }
    }

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_scalars() {
        let launch = launch();
        let vars = launch_vars(&launch);
        let args = strings(&[
            "-workDir",
            "$STAGEHAND_WORK_DIR",
            "--listen=$STAGEHAND_BIND_ADDRESS:$STAGEHAND_PORT",
        ]);

        assert_eq!(
            resolve_args(&args, &vars, &launch),
            strings(&[
                "-workDir",
                "/p/target/stagehand/work",
                "--listen=127.0.0.1:9876",
            ])
        );
    }

    #[test]
    fn test_resolve_splices_lists() {
        let launch = launch();
        let vars = launch_vars(&launch);
        let args = strings(&["codeserver", "$STAGEHAND_SOURCE_ROOTS", "$STAGEHAND_MODULES"]);

        assert_eq!(
            resolve_args(&args, &vars, &launch),
            strings(&[
                "codeserver",
                "/p/src/main/java",
                "/p/target/classes",
                "com.example.App",
                "com.example.Admin",
            ])
        );
    }

    #[test]
    fn test_resolve_repeats_flag_per_item() {
        let launch = launch();
        let vars = launch_vars(&launch);
        let args = strings(&[
            "-src=$STAGEHAND_SOURCE_ROOTS",
            "-bindAddress=$STAGEHAND_BIND_ADDRESS",
            "=$STAGEHAND_MODULES",
        ]);

        assert_eq!(
            resolve_args(&args, &vars, &launch),
            strings(&[
                "-src",
                "/p/src/main/java",
                "-src",
                "/p/target/classes",
                "-bindAddress=127.0.0.1",
                "=$STAGEHAND_MODULES",
            ])
        );
    }

    #[test]
    fn test_resolve_no_vars() {
        let launch = launch();
        let args = strings(&["echo", "hello"]);
        assert_eq!(resolve_args(&args, &FxHashMap::default(), &launch), args);
    }
}
