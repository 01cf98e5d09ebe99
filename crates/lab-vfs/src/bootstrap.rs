//! Seed image for the lab filesystem.
//!
//! Builds a small but plausible Linux server: the standard directory
//! skeleton, system config files, logs with a few interesting entries, a
//! web root, and a populated home directory for the interactive user.
//!
//! ```text
//! /
//! ├── bin/  boot/  dev/  lib/  media/  mnt/  opt/  run/  sbin/  srv/  sys/
//! ├── etc/          hostname, hosts, passwd, shadow, ssh/, nginx/ ...
//! ├── home/<user>/  .bashrc, .bash_history, notes.txt, projects/, scripts/
//! ├── proc/         cpuinfo, meminfo, version, uptime, loadavg
//! ├── root/
//! ├── tmp/          (1777)
//! ├── usr/
//! └── var/          log/, www/html/, backups/
//! ```
//!
//! The content depends only on the [`LabConfig`](crate::config::LabConfig),
//! never on the clock, so every reset produces the same tree.

use tracing::debug;

use crate::core::VfsResult;
use crate::filesystem::{CreateOptions, Filesystem};

/// Directories created root-owned with mode 0755.
const SYSTEM_DIRECTORIES: &[&str] = &[
    "/bin",
    "/boot",
    "/dev",
    "/etc",
    "/etc/cron.d",
    "/etc/nginx/sites-available",
    "/etc/nginx/sites-enabled",
    "/etc/ssh",
    "/home",
    "/lib",
    "/media",
    "/mnt",
    "/opt",
    "/proc",
    "/root",
    "/run",
    "/sbin",
    "/srv",
    "/sys",
    "/tmp",
    "/usr/bin",
    "/usr/lib",
    "/usr/local/bin",
    "/usr/sbin",
    "/usr/share",
    "/var/backups",
    "/var/cache",
    "/var/lib",
    "/var/log/nginx",
    "/var/tmp",
    "/var/www/html",
];

const HOSTS: &str = "\
127.0.0.1\tlocalhost
127.0.1.1\t{host}
10.0.2.15\t{host}.lab.internal {host}
10.0.2.20\tdb01.lab.internal db01
10.0.2.30\tbackup.lab.internal backup

# The following lines are desirable for IPv6 capable hosts
::1\tip6-localhost ip6-loopback
ff02::1\tip6-allnodes
ff02::2\tip6-allrouters
";

const RESOLV_CONF: &str = "\
# Generated by NetworkManager
search lab.internal
nameserver 10.0.2.3
nameserver 1.1.1.1
";

const FSTAB: &str = "\
# <file system>                           <mount point>  <type>  <options>          <dump> <pass>
UUID=3f1c6a2e-7b8d-4e21-9c55-0a1b2c3d4e5f  /              ext4    errors=remount-ro  0      1
UUID=8d2e4f60-1a3b-4c5d-8e9f-112233445566  /boot          ext4    defaults           0      2
/swapfile                                  none           swap    sw                 0      0
tmpfs                                      /tmp           tmpfs   defaults,noatime   0      0
";

const OS_RELEASE: &str = "\
PRETTY_NAME=\"Ubuntu 22.04.4 LTS\"
NAME=\"Ubuntu\"
VERSION_ID=\"22.04\"
VERSION=\"22.04.4 LTS (Jammy Jellyfish)\"
ID=ubuntu
ID_LIKE=debian
";

const MOTD: &str = "\
Welcome to the terminal lab.

Everything here is simulated. Nothing you do can break a real machine,
so explore freely. Type 'ls' to look around.
";

const SSHD_CONFIG: &str = "\
# OpenSSH server configuration
Port 22
AddressFamily any
ListenAddress 0.0.0.0

PermitRootLogin no
PubkeyAuthentication yes
PasswordAuthentication no
PermitEmptyPasswords no
ChallengeResponseAuthentication no

UsePAM yes
X11Forwarding no
PrintMotd no
MaxAuthTries 3
ClientAliveInterval 300

Subsystem sftp /usr/lib/openssh/sftp-server
";

const NGINX_CONF: &str = "\
user www-data;
worker_processes auto;
pid /run/nginx.pid;

events {
    worker_connections 768;
}

http {
    sendfile on;
    tcp_nopush on;
    types_hash_max_size 2048;

    include /etc/nginx/mime.types;
    default_type application/octet-stream;

    access_log /var/log/nginx/access.log;
    error_log /var/log/nginx/error.log;

    gzip on;

    include /etc/nginx/sites-enabled/*;
}
";

const NGINX_SITE: &str = "\
server {
    listen 80 default_server;
    listen [::]:80 default_server;

    root /var/www/html;
    index index.html;

    server_name _;

    location / {
        try_files $uri $uri/ =404;
    }
}
";

const CRONTAB: &str = "\
# m h dom mon dow user  command
17 *    * * *   root    cd / && run-parts --report /etc/cron.hourly
25 6    * * *   root    test -x /usr/sbin/anacron || run-parts --report /etc/cron.daily
";

const BACKUP_CRON: &str = "\
# Nightly backup of the web root
30 2 * * * root /usr/local/bin/backup.sh >> /var/log/backup.log 2>&1
";

const BACKUP_CONF: &str = "\
# Backup job configuration
SOURCE_DIRS=\"/var/www/html /etc/nginx /home/{user}/projects\"
DEST_HOST=backup.lab.internal
DEST_DIR=/srv/backups/{host}
RETENTION_DAYS=14
COMPRESS=gzip
NOTIFY_EMAIL=ops@lab.internal
";

const BACKUP_SCRIPT: &str = "\
#!/bin/bash
# Archive configured directories and ship them to the backup host.
set -euo pipefail
source /etc/backup.conf
STAMP=$(date +%Y%m%d)
tar -czf /var/backups/site-$STAMP.tar.gz $SOURCE_DIRS
scp /var/backups/site-$STAMP.tar.gz $DEST_HOST:$DEST_DIR/
find /var/backups -name 'site-*.tar.gz' -mtime +$RETENTION_DAYS -delete
";

const SYSLOG: &str = "\
Mar  4 06:25:01 {host} CRON[1123]: (root) CMD (test -x /usr/sbin/anacron || run-parts --report /etc/cron.daily)
Mar  4 08:00:12 {host} systemd[1]: Starting Daily apt download activities...
Mar  4 08:00:19 {host} systemd[1]: apt-daily.service: Deactivated successfully.
Mar  4 08:42:07 {host} kernel: [12873.441209] EXT4-fs (sda1): re-mounted. Opts: errors=remount-ro
Mar  4 09:01:33 {host} nginx[842]: 2024/03/04 09:01:33 [warn] 842#842: conflicting server name \"_\" on 0.0.0.0:80, ignored
Mar  4 09:10:55 {host} systemd[1]: Started Session 14 of User {user}.
Mar  4 09:12:40 {host} kernel: [14686.002315] Out of memory: Killed process 2211 (node) total-vm:2048000kB
Mar  4 09:14:02 {host} systemd[1]: Reloading The nginx HTTP and reverse proxy server...
";

const AUTH_LOG: &str = "\
Mar  4 07:58:14 {host} sshd[1502]: Invalid user admin from 203.0.113.45 port 52144
Mar  4 07:58:16 {host} sshd[1502]: Failed password for invalid user admin from 203.0.113.45 port 52144 ssh2
Mar  4 07:58:21 {host} sshd[1504]: Failed password for root from 203.0.113.45 port 52160 ssh2
Mar  4 07:58:27 {host} sshd[1506]: Failed password for root from 203.0.113.45 port 52171 ssh2
Mar  4 09:10:54 {host} sshd[1988]: Accepted publickey for {user} from 10.0.2.2 port 50322 ssh2
Mar  4 09:10:55 {host} sshd[1988]: pam_unix(sshd:session): session opened for user {user} by (uid=0)
Mar  4 09:13:11 {host} sudo:  {user} : TTY=pts/0 ; PWD=/home/{user} ; USER=root ; COMMAND=/usr/bin/systemctl status nginx
";

const ACCESS_LOG: &str = "\
10.0.2.2 - - [04/Mar/2024:09:02:11 +0000] \"GET / HTTP/1.1\" 200 612 \"-\" \"Mozilla/5.0\"
10.0.2.2 - - [04/Mar/2024:09:02:12 +0000] \"GET /favicon.ico HTTP/1.1\" 404 153 \"-\" \"Mozilla/5.0\"
198.51.100.7 - - [04/Mar/2024:09:05:40 +0000] \"GET /admin HTTP/1.1\" 404 153 \"-\" \"curl/7.81.0\"
198.51.100.7 - - [04/Mar/2024:09:05:41 +0000] \"GET /.env HTTP/1.1\" 404 153 \"-\" \"curl/7.81.0\"
10.0.2.2 - - [04/Mar/2024:09:11:03 +0000] \"GET /about.html HTTP/1.1\" 200 1024 \"-\" \"Mozilla/5.0\"
";

const NGINX_ERROR_LOG: &str = "\
2024/03/04 09:05:40 [error] 843#843: *12 open() \"/var/www/html/admin\" failed (2: No such file or directory), client: 198.51.100.7
";

const INDEX_HTML: &str = "\
<!DOCTYPE html>
<html>
<head>
  <title>Welcome to {host}</title>
</head>
<body>
  <h1>It works!</h1>
  <p>This page is served by nginx from /var/www/html.</p>
</body>
</html>
";

const ROOT_BASHRC: &str = "\
# ~/.bashrc for root
export PS1='\\u@\\h:\\w# '
alias ll='ls -l'
";

const BASHRC: &str = "\
# ~/.bashrc: executed by bash for non-login shells.
case $- in
    *i*) ;;
      *) return;;
esac

HISTSIZE=1000
HISTFILESIZE=2000

alias ll='ls -alF'
alias la='ls -A'
alias l='ls -CF'

export EDITOR=nano
";

const PROFILE: &str = "\
# ~/.profile: executed by the command interpreter for login shells.
if [ -n \"$BASH_VERSION\" ] && [ -f \"$HOME/.bashrc\" ]; then
    . \"$HOME/.bashrc\"
fi
PATH=\"$HOME/scripts:$PATH\"
";

const BASH_HISTORY: &str = "\
ls -la
cd /var/log
tail -n 20 syslog
sudo systemctl status nginx
cat /etc/nginx/nginx.conf
df -h
cd ~/projects
";

const NOTES: &str = "\
TODO for this week:
- rotate nginx logs, access.log is getting large
- check why the backup job failed on Saturday (see /var/log/backup.log)
- someone keeps trying to ssh in as root, look at /var/log/auth.log
- clean up /tmp
";

const PROJECT_README: &str = "\
# website

Static site deployed to /var/www/html.
Run ../scripts/deploy.sh after editing.
";

const DEPLOY_SCRIPT: &str = "\
#!/bin/bash
# Copy the site into the web root.
cp -r ~/projects/website/* /var/www/html/
echo \"deployed\"
";

const BACKUP_LOG: &str = "\
2024-03-02 02:30:01 starting backup
2024-03-02 02:30:04 ERROR: ssh: connect to host backup.lab.internal port 22: Connection timed out
2024-03-03 02:30:01 starting backup
2024-03-03 02:30:09 backup complete (14.2 MB)
";

const PROC_CPUINFO: &str = "\
processor\t: 0
vendor_id\t: GenuineIntel
model name\t: Intel(R) Xeon(R) CPU E5-2680 v4 @ 2.40GHz
cpu MHz\t\t: 2399.998
cache size\t: 35840 KB
cpu cores\t: 2

processor\t: 1
vendor_id\t: GenuineIntel
model name\t: Intel(R) Xeon(R) CPU E5-2680 v4 @ 2.40GHz
cpu MHz\t\t: 2399.998
cache size\t: 35840 KB
cpu cores\t: 2
";

const PROC_MEMINFO: &str = "\
MemTotal:        4028440 kB
MemFree:          512344 kB
MemAvailable:    1873220 kB
Buffers:          102400 kB
Cached:          1298132 kB
SwapTotal:       2097148 kB
SwapFree:        2097148 kB
";

const PROC_VERSION: &str =
    "Linux version 5.15.0-97-generic (buildd@lcy02-amd64-033) (gcc 11.4.0) #107-Ubuntu SMP\n";

const PROC_UPTIME: &str = "14723.52 28811.04\n";

const PROC_LOADAVG: &str = "0.42 0.35 0.28 1/187 2244\n";

/// Substitute host and user placeholders in a template.
fn render(template: &str, fs: &Filesystem) -> String {
    let config = fs.config();
    template
        .replace("{host}", &config.hostname)
        .replace("{user}", &config.username)
}

/// Populate a freshly rebuilt filesystem with the seed image.
///
/// Runs as root. Everything is root-owned except the interactive user's
/// home tree.
pub fn seed(fs: &mut Filesystem) -> VfsResult<()> {
    create_system_directories(fs)?;
    write_etc(fs)?;
    write_logs(fs)?;
    write_web_root(fs)?;
    write_proc(fs)?;
    create_user_home(fs)?;

    // World-writable with the sticky bit
    fs.chmod("/tmp", 0o1777)?;
    Ok(())
}

fn root_file(mode: u32) -> CreateOptions {
    CreateOptions::mode(mode).owned_by(0, 0)
}

fn create_system_directories(fs: &mut Filesystem) -> VfsResult<()> {
    let opts = root_file(0o755);
    for dir in SYSTEM_DIRECTORIES {
        fs.mkdir_p_with(dir, &opts)?;
    }
    fs.chmod("/root", 0o700)?;
    Ok(())
}

fn write_etc(fs: &mut Filesystem) -> VfsResult<()> {
    let config = fs.config().clone();
    let default = root_file(0o644);

    let files: Vec<(&str, String)> = vec![
        ("/etc/hostname", format!("{}\n", config.hostname)),
        ("/etc/hosts", render(HOSTS, fs)),
        ("/etc/resolv.conf", String::from(RESOLV_CONF)),
        ("/etc/passwd", fs.users().passwd()),
        ("/etc/group", fs.users().group_file()),
        ("/etc/fstab", String::from(FSTAB)),
        ("/etc/os-release", String::from(OS_RELEASE)),
        ("/etc/motd", String::from(MOTD)),
        ("/etc/crontab", String::from(CRONTAB)),
        ("/etc/cron.d/backup", String::from(BACKUP_CRON)),
        ("/etc/backup.conf", render(BACKUP_CONF, fs)),
        ("/etc/ssh/sshd_config", String::from(SSHD_CONFIG)),
        ("/etc/nginx/nginx.conf", String::from(NGINX_CONF)),
        ("/etc/nginx/sites-available/default", String::from(NGINX_SITE)),
        ("/etc/nginx/sites-enabled/default", String::from(NGINX_SITE)),
        ("/root/.bashrc", String::from(ROOT_BASHRC)),
    ];
    for (path, content) in files {
        fs.write_file_with(path, content, &default)?;
    }

    let shadow = fs.users().shadow();
    let shadow_gid = fs.users().group_by_name("shadow").map_or(0, |g| g.gid);
    fs.write_file_with(
        "/etc/shadow",
        shadow,
        &CreateOptions::mode(0o640).owned_by(0, shadow_gid),
    )?;

    fs.write_file_with("/usr/local/bin/backup.sh", BACKUP_SCRIPT, &default)?;
    Ok(())
}

fn write_logs(fs: &mut Filesystem) -> VfsResult<()> {
    let adm = fs.users().group_by_name("adm").map_or(0, |g| g.gid);
    let log = CreateOptions::mode(0o644).owned_by(0, adm);

    let syslog = render(SYSLOG, fs);
    let auth = render(AUTH_LOG, fs);
    fs.write_file_with("/var/log/syslog", syslog, &log)?;
    fs.write_file_with("/var/log/auth.log", auth, &log)?;
    fs.write_file_with("/var/log/nginx/access.log", ACCESS_LOG, &log)?;
    fs.write_file_with("/var/log/nginx/error.log", NGINX_ERROR_LOG, &log)?;
    fs.write_file_with("/var/log/backup.log", BACKUP_LOG, &root_file(0o644))?;
    Ok(())
}

fn write_web_root(fs: &mut Filesystem) -> VfsResult<()> {
    let index = render(INDEX_HTML, fs);
    fs.write_file_with("/var/www/html/index.html", index, &root_file(0o644))
}

fn write_proc(fs: &mut Filesystem) -> VfsResult<()> {
    let proc_file = root_file(0o444);
    let files = [
        ("/proc/cpuinfo", PROC_CPUINFO),
        ("/proc/meminfo", PROC_MEMINFO),
        ("/proc/version", PROC_VERSION),
        ("/proc/uptime", PROC_UPTIME),
        ("/proc/loadavg", PROC_LOADAVG),
    ];
    for (path, content) in files {
        fs.write_file_with(path, content, &proc_file)?;
    }
    Ok(())
}

/// Create and populate the interactive user's home, then hand the whole
/// tree to that user.
fn create_user_home(fs: &mut Filesystem) -> VfsResult<()> {
    let config = fs.config().clone();
    if config.uid == 0 {
        return Ok(());
    }

    let home = config.home();
    debug!(home = %home, uid = config.uid, "creating user home");
    let files: Vec<(String, String)> = vec![
        (format!("{}/.bashrc", home), String::from(BASHRC)),
        (format!("{}/.profile", home), String::from(PROFILE)),
        (format!("{}/.bash_history", home), String::from(BASH_HISTORY)),
        (format!("{}/notes.txt", home), String::from(NOTES)),
        (format!("{}/projects/website/README.md", home), String::from(PROJECT_README)),
        (format!("{}/projects/website/index.html", home), render(INDEX_HTML, fs)),
        (format!("{}/scripts/deploy.sh", home), String::from(DEPLOY_SCRIPT)),
    ];

    let file = root_file(0o644);
    fs.mkdir_p_with(&home, &root_file(0o755))?;
    for (path, content) in files {
        fs.write_file_with(&path, content, &file)?;
    }
    fs.mkdir_p_with(&format!("{}/Downloads", home), &root_file(0o755))?;

    fs.set_owner_recursive(&home, config.uid, config.gid)
}

#[cfg(test)]
mod tests {
    use crate::clock::ManualClock;
    use crate::config::LabConfig;
    use crate::core::{FindOptions, FindType};
    use crate::filesystem::Filesystem;

    fn seeded() -> Filesystem {
        Filesystem::with_config(LabConfig::default(), ManualClock::new(0)).unwrap()
    }

    fn mode(fs: &Filesystem, path: &str) -> u32 {
        fs.stat(path).unwrap().mode
    }

    #[test]
    fn test_skeleton() {
        let fs = seeded();
        for dir in [
            "/bin",
            "/etc",
            "/var/log",
            "/home/student",
            "/proc",
            "/tmp",
            "/usr/local/bin",
        ] {
            assert!(fs.is_dir(dir), "{} missing", dir);
        }
    }

    #[test]
    fn test_modes() {
        let fs = seeded();
        assert_eq!(mode(&fs, "/etc/shadow"), 0o640);
        assert_eq!(mode(&fs, "/etc/passwd"), 0o644);
        assert_eq!(mode(&fs, "/proc/cpuinfo"), 0o444);
        assert_eq!(mode(&fs, "/proc/loadavg"), 0o444);
        assert_eq!(mode(&fs, "/tmp"), 0o1777);
        assert_eq!(mode(&fs, "/etc"), 0o755);
    }

    #[test]
    fn test_every_seeded_file_follows_mode_rule() {
        let fs = seeded();
        let files = fs.find("/", &FindOptions::kind(FindType::File)).unwrap();
        assert!(!files.is_empty());
        for path in files {
            let expected = if path == "/etc/shadow" {
                0o640
            } else if path.starts_with("/proc/") {
                0o444
            } else {
                0o644
            };
            assert_eq!(mode(&fs, &path), expected, "{}", path);
        }
    }

    #[test]
    fn test_logs_keep_adm_group() {
        let fs = seeded();
        for path in ["/var/log/syslog", "/var/log/auth.log", "/var/log/nginx/access.log"] {
            assert_eq!(fs.stat(path).unwrap().group, "adm", "{}", path);
        }
    }

    #[test]
    fn test_ownership() {
        let fs = seeded();
        assert_eq!(fs.stat("/etc/hosts").unwrap().uid, 0);
        assert_eq!(fs.stat("/home").unwrap().uid, 0);
        for path in [
            "/home/student",
            "/home/student/notes.txt",
            "/home/student/projects/website/README.md",
        ] {
            let stat = fs.stat(path).unwrap();
            assert_eq!((stat.uid, stat.gid), (1000, 1000), "{}", path);
        }
        assert_eq!(fs.stat("/etc/shadow").unwrap().group, "shadow");
    }

    #[test]
    fn test_config_drives_content() {
        let config =
            LabConfig::from_json(r#"{"hostname": "web01", "username": "alice"}"#).unwrap();
        let mut fs = Filesystem::with_config(config, ManualClock::new(0)).unwrap();
        assert_eq!(fs.read_to_string("/etc/hostname").unwrap(), "web01\n");
        assert!(fs.read_to_string("/etc/passwd").unwrap().contains("alice:x:1000"));
        assert!(fs.is_dir("/home/alice"));
        assert!(fs
            .read_to_string("/var/log/auth.log")
            .unwrap()
            .contains("for alice from"));
    }

    #[test]
    fn test_system_files_present() {
        let fs = seeded();
        for path in [
            "/etc/hostname",
            "/etc/hosts",
            "/etc/resolv.conf",
            "/etc/group",
            "/etc/fstab",
            "/etc/ssh/sshd_config",
            "/etc/nginx/nginx.conf",
            "/etc/backup.conf",
            "/var/log/syslog",
            "/var/log/auth.log",
            "/var/log/nginx/access.log",
            "/var/www/html/index.html",
            "/home/student/.bashrc",
            "/home/student/.bash_history",
            "/proc/meminfo",
            "/proc/version",
            "/proc/uptime",
        ] {
            assert!(fs.is_file(path), "{} missing", path);
        }
    }

    #[test]
    fn test_root_session_has_no_home_tree() {
        let config = LabConfig::from_json(r#"{"username": "root", "uid": 0, "gid": 0}"#).unwrap();
        let fs = Filesystem::with_config(config, ManualClock::new(0)).unwrap();
        assert_eq!(fs.cwd(), "/root");
        assert_eq!(fs.find("/home", &Default::default()).unwrap(), vec!["/home"]);
    }
}
