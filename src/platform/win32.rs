use crate::monitor::anchor::{Anchor, HorizontalEdge, VerticalEdge};
use crate::monitor::color::OverlayColor;
use crate::monitor::display::{DisplayAdapter, OverlayHandle};
use crate::monitor::query::ForegroundTaskQuery;
use anyhow::{anyhow, Context};
use std::collections::HashMap;
use std::sync::Mutex;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{
    ERROR_CLASS_ALREADY_EXISTS, COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM,
};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, CreateSolidBrush, DeleteObject, DrawTextW, EndPaint, FillRect, RedrawWindow,
    SetBkMode, SetTextColor, DT_END_ELLIPSIS, DT_LEFT, DT_NOPREFIX, DT_RIGHT, DT_SINGLELINE,
    DT_VCENTER, PAINTSTRUCT, RDW_ERASE, RDW_INVALIDATE, TRANSPARENT,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetClientRect,
    GetForegroundWindow, GetSystemMetrics, GetWindowLongPtrW, GetWindowThreadProcessId,
    PeekMessageW, RegisterClassW, SetLayeredWindowAttributes, SetWindowLongPtrW, SetWindowPos,
    ShowWindow, TranslateMessage, CS_HREDRAW, CS_VREDRAW, GWLP_USERDATA, HMENU, HWND_TOPMOST,
    LWA_COLORKEY, MSG, PM_REMOVE, SM_CXSCREEN, SM_CYSCREEN, SWP_NOACTIVATE, SWP_NOSIZE,
    SW_SHOWNOACTIVATE, WM_PAINT, WNDCLASSW, WS_EX_LAYERED, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW,
    WS_EX_TOPMOST, WS_EX_TRANSPARENT, WS_POPUP,
};

const OVERLAY_CLASS_NAME: PCWSTR = w!("InfoOverlayTextWindow");
const OVERLAY_WIDTH: i32 = 640;
const OVERLAY_HEIGHT: i32 = 28;

// Pixels of this color are punched out of the window.
const COLOR_KEY: OverlayColor = OverlayColor::rgb(255, 0, 255);
const COLOR_KEY_SAFE_FALLBACK: OverlayColor = OverlayColor::rgb(254, 0, 255);

struct PaintState {
    text: Vec<u16>,
    color: OverlayColor,
    anchor: Anchor,
}

struct OverlayWindow {
    hwnd: HWND,
    // Read by the window procedure through GWLP_USERDATA.
    paint: Box<PaintState>,
}

/// Click-through, always-on-top text window pinned to a screen corner.
///
/// Windows are created on the calling thread; [`pump_messages`] has to run on
/// that same thread for them to repaint.
#[derive(Default)]
pub struct Win32TextOverlay {
    next_id: u64,
    windows: HashMap<u64, OverlayWindow>,
    class_registered: bool,
}

impl Win32TextOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_class_registered(&mut self, hinstance: HINSTANCE) -> anyhow::Result<()> {
        if self.class_registered {
            return Ok(());
        }

        let wc = WNDCLASSW {
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(overlay_wndproc),
            hInstance: hinstance,
            lpszClassName: OVERLAY_CLASS_NAME,
            ..Default::default()
        };
        let atom = unsafe { RegisterClassW(&wc) };
        if atom == 0 {
            let err = windows::core::Error::from_win32();
            if err.code() != ERROR_CLASS_ALREADY_EXISTS.to_hresult() {
                return Err(err).context("register overlay window class");
            }
        }
        self.class_registered = true;
        Ok(())
    }

    fn destroy(window: OverlayWindow) {
        unsafe {
            SetWindowLongPtrW(window.hwnd, GWLP_USERDATA, 0);
            let _ = DestroyWindow(window.hwnd);
        }
        drop(window.paint);
    }
}

impl DisplayAdapter for Win32TextOverlay {
    fn show(&mut self, anchor: Anchor, color: OverlayColor) -> anyhow::Result<OverlayHandle> {
        let module = unsafe { GetModuleHandleW(None) }.context("resolve module handle")?;
        let hinstance = HINSTANCE::from(module);
        self.ensure_class_registered(hinstance)?;

        let (x, y) = corner_origin(anchor);
        let mut paint = Box::new(PaintState {
            text: Vec::new(),
            color,
            anchor,
        });

        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_LAYERED
                    | WS_EX_TRANSPARENT
                    | WS_EX_TOPMOST
                    | WS_EX_TOOLWINDOW
                    | WS_EX_NOACTIVATE,
                OVERLAY_CLASS_NAME,
                PCWSTR::null(),
                WS_POPUP,
                x,
                y,
                OVERLAY_WIDTH,
                OVERLAY_HEIGHT,
                None,
                HMENU::default(),
                hinstance,
                None,
            )
        }
        .context("create overlay window")?;

        unsafe {
            SetWindowLongPtrW(
                hwnd,
                GWLP_USERDATA,
                paint.as_mut() as *mut PaintState as isize,
            );
        }
        let window = OverlayWindow { hwnd, paint };

        if let Err(err) =
            unsafe { SetLayeredWindowAttributes(hwnd, colorref(COLOR_KEY), 0, LWA_COLORKEY) }
        {
            Self::destroy(window);
            return Err(err).context("apply overlay color key");
        }
        unsafe {
            let _ = ShowWindow(hwnd, SW_SHOWNOACTIVATE);
            let _ = SetWindowPos(
                hwnd,
                HWND_TOPMOST,
                x,
                y,
                OVERLAY_WIDTH,
                OVERLAY_HEIGHT,
                SWP_NOACTIVATE,
            );
        }

        self.next_id += 1;
        let id = self.next_id;
        self.windows.insert(id, window);
        tracing::debug!(id, %anchor, "win32 overlay window created");
        Ok(OverlayHandle::new(id))
    }

    fn reposition(&mut self, handle: &OverlayHandle, anchor: Anchor) {
        let Some(window) = self.windows.get_mut(&handle.id()) else {
            return;
        };
        window.paint.anchor = anchor;
        let (x, y) = corner_origin(anchor);
        unsafe {
            let _ = SetWindowPos(
                window.hwnd,
                HWND_TOPMOST,
                x,
                y,
                0,
                0,
                SWP_NOACTIVATE | SWP_NOSIZE,
            );
        }
        invalidate(window.hwnd);
    }

    fn recolor(&mut self, handle: &OverlayHandle, color: OverlayColor) {
        if let Some(window) = self.windows.get_mut(&handle.id()) {
            window.paint.color = color;
            invalidate(window.hwnd);
        }
    }

    fn set_text(&mut self, handle: &OverlayHandle, text: &str) {
        if let Some(window) = self.windows.get_mut(&handle.id()) {
            window.paint.text = text.encode_utf16().collect();
            invalidate(window.hwnd);
        }
    }

    fn hide(&mut self, handle: &OverlayHandle) {
        if let Some(window) = self.windows.remove(&handle.id()) {
            Self::destroy(window);
            tracing::debug!(id = handle.id(), "win32 overlay window destroyed");
        }
    }
}

impl Drop for Win32TextOverlay {
    fn drop(&mut self) {
        for (_, window) in self.windows.drain() {
            Self::destroy(window);
        }
    }
}

/// Drain the message queue of the calling thread.
pub(crate) fn pump_messages() {
    let mut msg = MSG::default();
    unsafe {
        while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}

unsafe extern "system" fn overlay_wndproc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_PAINT {
        let state_ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA);
        if state_ptr != 0 {
            let state = &*(state_ptr as *const PaintState);
            paint_overlay(hwnd, state);
            return LRESULT(0);
        }
    }
    DefWindowProcW(hwnd, msg, wparam, lparam)
}

unsafe fn paint_overlay(hwnd: HWND, state: &PaintState) {
    let mut paint = PAINTSTRUCT::default();
    let hdc = BeginPaint(hwnd, &mut paint);
    let mut rect = RECT::default();
    let _ = GetClientRect(hwnd, &mut rect);

    let key_brush = CreateSolidBrush(colorref(COLOR_KEY));
    FillRect(hdc, &rect, key_brush);
    let _ = DeleteObject(key_brush);

    // Unset color means invisible text: leave the window fully keyed out.
    if !state.color.is_unset() && !state.text.is_empty() {
        let align = match state.anchor.horizontal {
            HorizontalEdge::Left => DT_LEFT,
            HorizontalEdge::Right => DT_RIGHT,
        };
        let mut text = state.text.clone();
        SetBkMode(hdc, TRANSPARENT);
        SetTextColor(hdc, colorref(text_color(state.color)));
        DrawTextW(
            hdc,
            &mut text,
            &mut rect,
            align | DT_SINGLELINE | DT_VCENTER | DT_NOPREFIX | DT_END_ELLIPSIS,
        );
    }

    let _ = EndPaint(hwnd, &paint);
}

fn invalidate(hwnd: HWND) {
    unsafe {
        let _ = RedrawWindow(hwnd, None, None, RDW_INVALIDATE | RDW_ERASE);
    }
}

fn corner_origin(anchor: Anchor) -> (i32, i32) {
    let (screen_width, screen_height) =
        unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
    let x = match anchor.horizontal {
        HorizontalEdge::Left => 0,
        HorizontalEdge::Right => (screen_width - OVERLAY_WIDTH).max(0),
    };
    let y = match anchor.vertical {
        VerticalEdge::Top => 0,
        VerticalEdge::Bottom => (screen_height - OVERLAY_HEIGHT).max(0),
    };
    (x, y)
}

// Text drawn in the key color would vanish; nudge it off the key.
fn text_color(color: OverlayColor) -> OverlayColor {
    if color.r == COLOR_KEY.r && color.g == COLOR_KEY.g && color.b == COLOR_KEY.b {
        COLOR_KEY_SAFE_FALLBACK
    } else {
        color
    }
}

fn colorref(color: OverlayColor) -> COLORREF {
    COLORREF(u32::from(color.r) | (u32::from(color.g) << 8) | (u32::from(color.b) << 16))
}

/// Reports the executable name of the process owning the foreground window.
pub struct Win32ForegroundQuery {
    system: Mutex<System>,
}

impl Win32ForegroundQuery {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for Win32ForegroundQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl ForegroundTaskQuery for Win32ForegroundQuery {
    fn current_foreground_task(&self) -> anyhow::Result<Option<String>> {
        let hwnd = unsafe { GetForegroundWindow() };
        if hwnd.0.is_null() {
            return Ok(None);
        }

        let mut pid = 0u32;
        unsafe {
            GetWindowThreadProcessId(hwnd, Some(&mut pid));
        }
        if pid == 0 {
            return Ok(None);
        }

        let pid = Pid::from_u32(pid);
        let mut system = self
            .system
            .lock()
            .map_err(|_| anyhow!("process table lock poisoned"))?;
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing(),
        );
        Ok(system
            .process(pid)
            .map(|process| process.name().to_string_lossy().into_owned()))
    }
}
