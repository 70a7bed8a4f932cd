// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

pub mod secret;
pub mod tui;

const VERTEX_LOGO: [&str; 6] = [
    "██┐   ██┐ ███████┐ ██████┐  ████████┐ ███████┐ ██┐  ██┐",
    "██│   ██│ ██┌────┘ ██┌──██┐ └──██┌──┘ ██┌────┘ └██┐██┌┘",
    "██│   ██│ █████┐   ██████┌┘    ██│    █████┐    └███┌┘ ",
    "└██┐ ██┌┘ ██┌──┘   ██┌──██┐    ██│    ██┌──┘    ██┌██┐ ",
    " └████┌┘  ███████┐ ██│  ██│    ██│    ███████┐ ██┌┘ ██┐",
    "  └───┘   └──────┘ └─┘  └─┘    └─┘    └──────┘ └─┘  └─┘",
];

pub fn get_vertex_logo() -> String {
    use owo_colors::OwoColorize;

    let gradient_start = (0x4F, 0x46, 0xE5); // 0x4F46E5
    let gradient_end = (0x22, 0xD3, 0xEE); // 0x22D3EE
    let shadow_color = (0x81, 0x8C, 0xF8); // 0x818CF8

    let mut result = String::new();

    for line in VERTEX_LOGO.iter() {
        let line_length = line.chars().filter(|c| *c == '█').count();
        let mut main_char_index = 0;

        for ch in line.chars() {
            if ch == '█' {
                let position = if line_length > 1 {
                    main_char_index as f32 / (line_length - 1) as f32
                } else {
                    0.0
                };

                let r = lerp(gradient_start.0, gradient_end.0, position);
                let g = lerp(gradient_start.1, gradient_end.1, position);
                let b = lerp(gradient_start.2, gradient_end.2, position);

                result.push_str(&format!("{}", ch.truecolor(r, g, b)));
                main_char_index += 1;
            } else if matches!(ch, '└' | '┌' | '┐' | '┘' | '─' | '│') {
                result.push_str(&format!(
                    "{}",
                    ch.truecolor(shadow_color.0, shadow_color.1, shadow_color.2)
                ));
            } else {
                result.push(ch);
            }
        }
        result.push('\n');
    }

    result
}

fn lerp(start: u8, end: u8, position: f32) -> u8 {
    (start as f32 + (end as f32 - start as f32) * position) as u8
}
