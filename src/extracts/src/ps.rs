use anyhow::{bail, Result};
use pstree_common::ProcessRecord;

/// Command run inside the container to list its processes.
pub const PS_ARGS: [&str; 4] = ["ps", "ax", "-o", "pid,ppid,ruser,args"];

/// Splits raw exec output into lines, replacing invalid UTF-8.
pub fn output_lines(raw: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(raw)
        .lines()
        .map(str::to_string)
        .collect()
}

fn next_column(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_start();
    if line.is_empty() {
        return None;
    }
    match line.find(char::is_whitespace) {
        Some(end) => Some((&line[..end], &line[end..])),
        None => Some((line, "")),
    }
}

fn parse_ps_line(line: &str) -> Option<ProcessRecord> {
    let (pid, rest) = next_column(line)?;
    let (ppid, rest) = next_column(rest)?;
    let (ruser, rest) = next_column(rest)?;
    let args = rest.trim();
    if args.is_empty() {
        return None;
    }
    Some(ProcessRecord::new(pid, ppid, ruser, args))
}

/// Parses `ps ax -o pid,ppid,ruser,args` output.
///
/// The first line is the header. The `ps` process that produced the listing
/// is left out since it is not part of the container's own tree.
pub fn parse_ps_output(lines: &[String]) -> Result<Vec<ProcessRecord>> {
    let ps_command = PS_ARGS.join(" ");
    let mut rows = Vec::new();

    for (line_no, line) in lines.iter().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let Some(row) = parse_ps_line(line) else {
            bail!("Malformed ps output on line {}: {:?}", line_no + 1, line);
        };
        if row.args == ps_command {
            continue;
        }
        rows.push(row);
    }

    tracing::debug!("Parsed {} process rows from ps output", rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PS_OUTPUT: &str = "  PID  PPID RUSER    COMMAND
    1     0 root     tini -- django-entrypoint.sh mysite.wsgi:application
    6     1 django   /usr/local/bin/python /usr/local/bin/gunicorn  --bind unix:/tmp/g.sock
   18     6 root     nginx: master process nginx -g daemon off;
   31     0 root     ps ax -o pid,ppid,ruser,args
";

    #[test]
    fn test_parse_ps_output() {
        let rows = parse_ps_output(&output_lines(PS_OUTPUT.as_bytes())).unwrap();

        assert_eq!(
            rows,
            vec![
                ProcessRecord::new(
                    "1",
                    "0",
                    "root",
                    "tini -- django-entrypoint.sh mysite.wsgi:application"
                ),
                ProcessRecord::new(
                    "6",
                    "1",
                    "django",
                    "/usr/local/bin/python /usr/local/bin/gunicorn  --bind unix:/tmp/g.sock"
                ),
                ProcessRecord::new("18", "6", "root", "nginx: master process nginx -g daemon off;"),
            ]
        );
    }

    #[test]
    fn test_parse_ps_output_rejects_short_lines() {
        let lines = output_lines(b"PID PPID RUSER COMMAND\n 1 0 root\n");
        let err = parse_ps_output(&lines).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_output_lines_is_lossy() {
        assert_eq!(output_lines(b"a\nb\xff\n"), vec!["a", "b\u{fffd}"]);
    }
}
