use agentbox_core::mounts::Mount;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Mount table: kind, host path, container path.
pub fn print_mounts(mounts: &[Mount]) {
    print!("{}", mount_table(mounts));
}

fn mount_table(mounts: &[Mount]) -> String {
    let rows: Vec<[String; 3]> = mounts
        .iter()
        .map(|m| {
            [
                m.kind.as_str().to_string(),
                m.host.display().to_string(),
                m.container.display().to_string(),
            ]
        })
        .collect();

    let headers = ["MOUNT", "HOST", "CONTAINER"];
    let kind_w = rows.iter().map(|r| r[0].len()).fold(headers[0].len(), usize::max);
    let host_w = rows.iter().map(|r| r[1].len()).fold(headers[1].len(), usize::max);

    let mut out = format!("{:kind_w$}  {:host_w$}  {}\n", headers[0], headers[1], headers[2]);
    for [kind, host, container] in &rows {
        out.push_str(&format!("{kind:kind_w$}  {host:host_w$}  {container}\n"));
    }
    out
}

/// Shell-quoted command line, suitable for copy and paste.
pub fn shell_line(program: &str, args: &[String]) -> String {
    let words = std::iter::once(program).chain(args.iter().map(String::as_str));
    shlex::try_join(words.clone()).unwrap_or_else(|_| words.collect::<Vec<_>>().join(" "))
}
