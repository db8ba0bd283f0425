use console::Style;
use parallax_core::offset::OffsetParams;
use parallax_core::session::{PreprocessOutput, Registration, SessionStage, StereoSession};

use crate::commands::offset::OffsetArgs;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

fn print_title(s: &Styles, title: &str) {
    println!();
    println!("  {}", s.title.apply_to(title));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(title.chars().count())));
    println!();
}

pub fn print_session_summary(session: &StereoSession, stage: SessionStage) {
    let s = Styles::new();
    let config = session.config();

    print_title(&s, &format!("Parallax {stage}"));
    println!("  {:<14}{}", s.label.apply_to("Left"), s.path.apply_to(session.left().display()));
    println!("  {:<14}{}", s.label.apply_to("Right"), s.path.apply_to(session.right().display()));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Prefix"),
        s.path.apply_to(config.out_prefix.display())
    );
    println!();

    match stage {
        SessionStage::Preprocessing => {
            println!("  {}", s.header.apply_to("Alignment"));
            if config.alignment.enabled {
                println!(
                    "    {:<12}{}",
                    s.label.apply_to("Points"),
                    s.value.apply_to(config.alignment.point_budget)
                );
                println!(
                    "    {:<12}{}",
                    s.label.apply_to("Ratio"),
                    s.value.apply_to(config.alignment.match_ratio)
                );
                println!(
                    "    {:<12}{} px",
                    s.label.apply_to("Inlier tol"),
                    s.value.apply_to(config.alignment.ransac.inlier_threshold)
                );
                println!(
                    "    {:<12}{}",
                    s.label.apply_to("Cache"),
                    s.path.apply_to(config.resolved_cache_dir().display())
                );
            } else {
                println!("    {}", s.disabled.apply_to("disabled"));
            }
        }
        SessionStage::Filtering => {
            println!("  {}", s.header.apply_to("Masking"));
            if config.filtering.mask_near_black {
                println!(
                    "    {:<12}{}",
                    s.label.apply_to("Threshold"),
                    s.value.apply_to(config.filtering.near_black_threshold)
                );
            } else {
                println!("    {}", s.disabled.apply_to("disabled, passing through"));
            }
        }
        SessionStage::Correlation | SessionStage::PointCloud => {}
    }
    println!();
}

pub fn print_preprocess_result(session: &StereoSession, out: &PreprocessOutput) {
    let s = Styles::new();
    let path = match out.registration {
        Registration::MapProjected { .. } => "map-projected",
        Registration::Unprojected => "feature alignment",
    };
    println!("  {:<14}{}", s.label.apply_to("Registration"), s.method.apply_to(path));
    println!(
        "  {:<14}{:.4} .. {:.4}",
        s.label.apply_to("Range"),
        s.value.apply_to(out.range.0),
        s.value.apply_to(out.range.1)
    );
    if !out.registration.is_map_projected() {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Matrix"),
            s.path.apply_to(session.paths().align_matrix().display())
        );
    }
    println!("  {:<14}{}", s.label.apply_to("Left out"), s.path.apply_to(out.left.display()));
    println!("  {:<14}{}", s.label.apply_to("Right out"), s.path.apply_to(out.right.display()));
}

pub fn print_offset_summary(args: &OffsetArgs, params: &OffsetParams) {
    let s = Styles::new();
    let corr = &params.correlation;

    print_title(&s, "Parallax Offset");
    println!("  {:<14}{}", s.label.apply_to("Left"), s.path.apply_to(args.left.display()));
    println!("  {:<14}{}", s.label.apply_to("Right"), s.path.apply_to(args.right.display()));
    println!();

    println!("  {}", s.header.apply_to("Correlation"));
    println!("    {:<12}{}", s.label.apply_to("Cost"), s.method.apply_to(corr.cost));
    println!(
        "    {:<12}{}x{}",
        s.label.apply_to("Kernel"),
        s.value.apply_to(corr.kernel.0),
        s.value.apply_to(corr.kernel.1)
    );
    println!(
        "    {:<12}h [{}, {}]  v [{}, {}]",
        s.label.apply_to("Search"),
        corr.search.h_min,
        corr.search.h_max,
        corr.search.v_min,
        corr.search.v_max
    );
    println!("    {:<12}{}", s.label.apply_to("LR thresh"), s.value.apply_to(corr.lr_threshold));
    println!("    {:<12}{}", s.label.apply_to("Crop width"), s.value.apply_to(params.crop_width));
    if params.log_sigma > 0.0 {
        println!("    {:<12}{}", s.label.apply_to("LoG sigma"), s.value.apply_to(params.log_sigma));
    } else {
        println!("    {:<12}{}", s.label.apply_to("LoG"), s.disabled.apply_to("off"));
    }
    if corr.pyramid {
        println!("    {:<12}{}", s.label.apply_to("Search"), s.method.apply_to("pyramid"));
    }
    println!();
}
