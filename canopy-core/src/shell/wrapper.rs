use super::ShellKind;
use crate::constants::{APP_NAME, SWITCH_FILE_ENV};

pub const BLOCK_START: &str = "# >>> canopy shell integration >>>";
pub const BLOCK_END: &str = "# <<< canopy shell integration <<<";

/// The marker-delimited rc block defining the `canopy` shell function.
///
/// The function runs the binary with the switch file set, then `cd`s into the
/// directive's path and attaches to that worktree's tmux session, creating it (and
/// launching `assistant_command` unless the switch is terminal-only) when missing.
/// Session names are derived exactly like `tmux::session_name_for`.
pub fn block(shell: ShellKind, assistant_command: &str) -> String {
    let assistant = shlex::try_quote(assistant_command)
        .map_or_else(|_| "''".to_string(), |quoted| quoted.into_owned());
    let body = match shell {
        ShellKind::Bash | ShellKind::Zsh => posix_function(&assistant),
        ShellKind::Fish => fish_function(&assistant),
    };
    format!("{BLOCK_START}\n{body}{BLOCK_END}\n")
}

// `path` and `status` are special in zsh, hence `target_dir` and `exit_code`.
fn posix_function(assistant: &str) -> String {
    format!(
        r#"{APP_NAME}() {{
    local switch_file exit_code line rest target_dir terminal_only auto_launch session
    switch_file="$(mktemp -t {APP_NAME}-switch.XXXXXX)" || return 1
    {SWITCH_FILE_ENV}="$switch_file" command {APP_NAME} "$@"
    exit_code=$?
    if [ -s "$switch_file" ]; then
        line="$(cat "$switch_file")"
        rm -f "$switch_file"
        terminal_only="${{line##*|}}"
        rest="${{line%|*}}"
        auto_launch="${{rest##*|}}"
        rest="${{rest%|*}}"
        target_dir="${{rest%|*}}"
        cd "$target_dir" || return 1
        session="$(basename "$target_dir" | tr '.:' '__')"
        if [ "$terminal_only" = "true" ]; then
            session="$session-terminal"
        fi
        if ! tmux has-session -t "=$session" 2>/dev/null; then
            tmux new-session -ds "$session" -c "$target_dir"
            if [ "$auto_launch" = "true" ] && [ "$terminal_only" != "true" ]; then
                tmux send-keys -t "$session" {assistant} Enter
            fi
        fi
        if [ -n "$TMUX" ]; then
            tmux switch-client -t "$session"
        else
            tmux attach-session -t "$session"
        fi
    else
        rm -f "$switch_file"
    fi
    return $exit_code
}}
"#
    )
}

fn fish_function(assistant: &str) -> String {
    format!(
        r#"function {APP_NAME}
    set -l switch_file (mktemp -t {APP_NAME}-switch.XXXXXX); or return 1
    env {SWITCH_FILE_ENV}=$switch_file {APP_NAME} $argv
    set -l exit_code $status
    if test -s $switch_file
        set -l fields (string split '|' -- (cat $switch_file))
        rm -f $switch_file
        set -l terminal_only $fields[-1]
        set -l auto_launch $fields[-2]
        set -l target_dir (string join '|' -- $fields[1..-4])
        cd $target_dir; or return 1
        set -l session (basename $target_dir | string replace -a -r '[.:]' '_')
        if test "$terminal_only" = true
            set session "$session-terminal"
        end
        if not tmux has-session -t "=$session" 2>/dev/null
            tmux new-session -ds $session -c $target_dir
            if test "$auto_launch" = true; and test "$terminal_only" != true
                tmux send-keys -t $session {assistant} Enter
            end
        end
        if set -q TMUX
            tmux switch-client -t $session
        else
            tmux attach-session -t $session
        end
    else
        rm -f $switch_file
    end
    return $exit_code
end
"#
    )
}
