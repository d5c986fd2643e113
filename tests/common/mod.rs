use assert_cmd::Command;

pub fn nudge_bin() -> Command {
    #[allow(deprecated)]
    {
        Command::cargo_bin("nudge").expect("nudge test binary should build")
    }
}
