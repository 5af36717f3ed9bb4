//! 시작 로그 포맷팅
//!
//! 레지스트리 초기화 진행 상황을 터미널에 보기 좋게 출력합니다.
//!
//! ```text
//! ╔══════════════════════════════════════════════════╗
//! ║          🔄 INITIALIZING SERVICE REGISTRY         ║
//! ╚══════════════════════════════════════════════════╝
//! → Step 1: Initializing repositories
//!    ├─ User: users
//!    ├─ Tour: tours
//! ✓ Step 1: Repositories initialized (4 items)
//! ```

const BOX_WIDTH: usize = 50;

/// 가운데 정렬된 세 줄짜리 박스 제목
pub fn boxed_title(title: &str) -> String {
    let border = "═".repeat(BOX_WIDTH);
    format!("╔{border}╗\n║{:^width$}║\n╚{border}╝", title, width = BOX_WIDTH - 1)
}

pub fn print_boxed_title(title: &str) {
    println!("{}", boxed_title(title));
}

pub fn print_step_start(step: u8, description: &str) {
    println!("→ Step {}: {}", step, description);
}

pub fn print_step_complete(step: u8, description: &str, count: usize) {
    println!("✓ Step {}: {} ({} items)", step, description, count);
}

/// 하위 항목 한 줄 (`   ├─ name: status`)
pub fn print_sub_task(name: &str, status: &str) {
    println!("   ├─ {}: {}", name, status);
}

/// 초기화 완료 후 등록된 컴포넌트 수 요약
pub fn print_final_summary(repos: usize, services: usize) {
    println!();
    print_boxed_title("🧭 TOUR BOOKING REGISTRY READY");
    println!("   📦 Repositories: {}", repos);
    println!("   🔧 Services: {}", services);
    println!("   🚀 Total Components: {}", repos + services);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boxed_title_lines_have_same_width() {
        let boxed = boxed_title("READY");
        let widths: Vec<usize> = boxed.lines().map(|line| line.chars().count()).collect();

        assert_eq!(widths.len(), 3);
        assert!(widths.iter().all(|w| *w == widths[0]));
        assert!(boxed.lines().nth(1).unwrap().contains("READY"));
    }
}
