use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use parecer_gen::models::parse_birth_date;
use parecer_gen::utils::logging;
use parecer_gen::{Config, ParecerFlow, ParecerForm, PayloadStatus};

const DEFAULT_CONFIG: &str = "parecer.toml";

/// 学生评语生成与存档
#[derive(Parser)]
#[command(name = "parecer", version)]
struct Cli {
    /// 配置文件，默认读取当前目录下的 parecer.toml（如果存在）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 显示详细日志
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 生成并保存一份新评语
    Submit(SubmitArgs),
    /// 列出已有评语的学生
    Students,
    /// 列出名册中的学生
    Roster,
    /// 列出某个学生的历史评语
    Reports {
        /// 学生姓名（精确匹配）
        #[arg(long)]
        student: String,
    },
    /// 导出某条历史评语的 docx
    Download {
        /// 学生姓名（精确匹配）
        #[arg(long)]
        student: String,
        /// 评语序号，从 1 开始
        #[arg(long)]
        number: usize,
        /// 输出目录
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(clap::Args)]
struct SubmitArgs {
    /// 学生姓名
    #[arg(long)]
    student: String,
    /// 母亲姓名
    #[arg(long, default_value = "")]
    mother: String,
    /// 父亲姓名
    #[arg(long, default_value = "")]
    father: String,
    /// 地址
    #[arg(long, default_value = "")]
    address: String,
    /// 籍贯
    #[arg(long, default_value = "")]
    birthplace: String,
    /// 出生日期（DD/MM/YYYY 或 YYYY-MM-DD）
    #[arg(long)]
    birth_date: String,
    /// 学期
    #[arg(long, default_value = "")]
    period: String,
    /// 班次
    #[arg(long, default_value = "")]
    shift: String,
    /// 评语正文
    #[arg(long, conflicts_with = "text_file")]
    text: Option<String>,
    /// 从文件读取评语正文
    #[arg(long)]
    text_file: Option<PathBuf>,
    /// 备注
    #[arg(long, default_value = "")]
    observation: String,
    /// 学生已不再上学
    #[arg(long)]
    did_not_attend: bool,
    /// 生成的 docx 输出目录
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

impl SubmitArgs {
    fn into_form(self) -> Result<(ParecerForm, PathBuf)> {
        let evaluation_text = match (self.text, &self.text_file) {
            (Some(text), _) => text,
            (None, Some(path)) => fs::read_to_string(path)
                .with_context(|| format!("无法读取评语文件: {}", path.display()))?,
            (None, None) => String::new(),
        };

        let form = ParecerForm {
            student_name: self.student,
            mother_name: self.mother,
            father_name: self.father,
            address: self.address,
            birthplace: self.birthplace,
            birth_date: parse_birth_date(&self.birth_date)?,
            period: self.period,
            shift: self.shift,
            evaluation_text,
            observation: self.observation,
            did_not_attend: self.did_not_attend,
        };
        Ok((form, self.out_dir))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config_path = cli
        .config
        .clone()
        .or_else(|| Some(PathBuf::from(DEFAULT_CONFIG)).filter(|p| p.is_file()));
    let config = Config::load(config_path.as_deref()).context("加载配置失败")?;

    // 初始化日志
    logging::init(config.verbose_logging || cli.verbose);
    logging::log_startup(&config);

    let flow = ParecerFlow::new(&config);

    match cli.command {
        Command::Submit(args) => {
            let (form, out_dir) = args.into_form()?;
            let outcome = flow.submit(&form).context("生成评语失败")?;
            let path = write_document(&out_dir, &outcome.download_name, &outcome.document)?;
            println!("评语 #{} 已保存: {}", outcome.record.id, path.display());
        }
        Command::Students => {
            let students = flow.students_with_reports()?;
            if students.is_empty() {
                println!("还没有保存任何评语");
            }
            for name in students {
                println!("{name}");
            }
        }
        Command::Roster => {
            for name in config.sorted_roster() {
                println!("{name}");
            }
        }
        Command::Reports { student } => print_reports(&flow, &student)?,
        Command::Download {
            student,
            number,
            out_dir,
        } => {
            let index = number.checked_sub(1).context("评语序号从 1 开始")?;
            let (name, bytes) = flow.archived_document(&student, index)?;
            let path = write_document(&out_dir, &name, &bytes)?;
            println!("已导出: {}", path.display());
        }
    }

    Ok(())
}

fn print_reports(flow: &ParecerFlow, student: &str) -> Result<()> {
    let reports = flow.saved_reports(student)?;
    if reports.is_empty() {
        println!("没有找到 {student} 的评语");
        return Ok(());
    }

    println!("{student} 的评语");
    for report in reports {
        let record = &report.record;
        println!("{}", "-".repeat(60));
        println!("评语 {} - 保存于 {}", report.index + 1, record.created_at);
        println!("姓名: {}", record.student_name);
        if record.did_not_attend {
            println!("该学生已不再上学");
        } else {
            println!("评语: {}", record.evaluation_text);
            if !record.observation.is_empty() {
                println!("备注: {}", record.observation);
            }
        }
        match &report.payload {
            PayloadStatus::Available { download_name, .. } => println!("文档: {download_name}"),
            PayloadStatus::Missing => println!("评语 {} 没有 docx 文档", report.index + 1),
            PayloadStatus::Corrupted(e) => println!("无法读取评语 {} 的 docx: {e}", report.index + 1),
        }
    }
    Ok(())
}

fn write_document(out_dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("无法创建目录: {}", out_dir.display()))?;
    let path = out_dir.join(name);
    fs::write(&path, bytes).with_context(|| format!("无法写入文件: {}", path.display()))?;
    info!("💾 已写入 {}", path.display());
    Ok(path)
}
