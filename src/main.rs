//! 程序入口：初始化日志、加载 Slint UI，并绑定 VM

use std::{cell::RefCell, rc::Rc};
use tracing_subscriber::fmt::SubscriberBuilder;
use slint::{ComponentHandle, Model, ModelRc, SharedString, VecModel};

slint::include_modules!();

use type_tree_editor::model::editor_state::{EditError, EditorState};
use type_tree_editor::model::tree_rows::TypeRow;
use type_tree_editor::model::type_node::TypeKind;
use type_tree_editor::vm::bridge::*;

// TypeRowData转换实现
impl From<&TypeRow> for TypeRowData {
    /// 将Rust TypeRow转换为Slint可用的数据结构
    fn from(row: &TypeRow) -> Self {
        Self {
            path: path_key(&row.path).into(),
            id: row.id.0.to_string().into(),
            name: row.name.clone().into(),
            kind_index: row.kind.index() as i32,
            depth: row.depth as i32,
            name_editable: row.name_editable(),
            deletable: row.deletable(),
            can_add_field: row.can_add_field(),
        }
    }
}

/// 一次编辑命令的结果会触发哪些刷新
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refresh {
    /// 行结构不变，只原地更新被编辑的那一行（避免重建输入框）
    SingleRow,
    /// 行结构也可能变化
    Rows,
}

/// VM桥接器：管理UI与数据层的交互
struct ViewModelBridge {
    editor_state: Rc<RefCell<EditorState>>,
    // 左侧行模型，整个生命周期内复用同一个实例
    tree_model: Rc<VecModel<TypeRowData>>,
}

impl ViewModelBridge {
    /// 创建新的VM桥接器并绑定所有回调
    fn new(app_window: &AppWindow, editor_state: Rc<RefCell<EditorState>>) -> Self {
        let bridge = Self {
            editor_state,
            tree_model: Rc::new(VecModel::default()),
        };
        bridge.setup_callbacks(app_window);
        bridge
    }

    /// 设置所有UI回调函数
    fn setup_callbacks(&self, app_window: &AppWindow) {
        let editor_state = self.editor_state.clone();
        let tree_model = self.tree_model.clone();

        // === 改名回调 ===
        {
            let editor_state = editor_state.clone();
            let tree_model = tree_model.clone();
            let app_window_weak = app_window.as_weak();
            app_window.on_name_edited(move |path, name| {
                if let Some(app_window) = app_window_weak.upgrade() {
                    Self::handle_command(
                        &app_window,
                        &editor_state,
                        &tree_model,
                        &path,
                        STATUS_RENAMED,
                        Refresh::SingleRow,
                        |state, p| state.rename(p, name.as_str()),
                    );
                }
            });
        }

        // === 类型切换回调 ===
        {
            let editor_state = editor_state.clone();
            let tree_model = tree_model.clone();
            let app_window_weak = app_window.as_weak();
            app_window.on_kind_selected(move |path, kind| {
                if let Some(app_window) = app_window_weak.upgrade() {
                    Self::handle_command(
                        &app_window,
                        &editor_state,
                        &tree_model,
                        &path,
                        STATUS_KIND_CHANGED,
                        Refresh::Rows,
                        |state, p| {
                            let kind: TypeKind = kind.as_str().parse()?;
                            state.change_kind(p, kind)
                        },
                    );
                }
            });
        }

        // === 添加字段回调 ===
        {
            let editor_state = editor_state.clone();
            let tree_model = tree_model.clone();
            let app_window_weak = app_window.as_weak();
            app_window.on_add_field(move |path| {
                if let Some(app_window) = app_window_weak.upgrade() {
                    Self::handle_command(
                        &app_window,
                        &editor_state,
                        &tree_model,
                        &path,
                        STATUS_FIELD_ADDED,
                        Refresh::Rows,
                        |state, p| state.add_field(p),
                    );
                }
            });
        }

        // === 删除字段回调 ===
        {
            let editor_state = editor_state.clone();
            let tree_model = tree_model.clone();
            let app_window_weak = app_window.as_weak();
            app_window.on_delete_field(move |path| {
                if let Some(app_window) = app_window_weak.upgrade() {
                    Self::handle_command(
                        &app_window,
                        &editor_state,
                        &tree_model,
                        &path,
                        STATUS_FIELD_DELETED,
                        Refresh::Rows,
                        |state, p| state.delete_field(p),
                    );
                }
            });
        }

        // === 结构 JSON 显示切换 ===
        {
            let app_window_weak = app_window.as_weak();
            app_window.on_structure_toggled(move || {
                if let Some(app_window) = app_window_weak.upgrade() {
                    Self::refresh_structure(&app_window, &editor_state);
                }
            });
        }
    }

    /// 初始化UI状态
    fn initialize_ui(&self, app_window: &AppWindow) {
        let options: Vec<SharedString> = kind_labels()
            .into_iter()
            .map(SharedString::from)
            .collect();
        app_window.set_kind_options(ModelRc::new(VecModel::from(options)));
        app_window.set_tree_model(ModelRc::from(self.tree_model.clone()));
        app_window.set_status_message(STATUS_READY.into());
        Self::refresh_all(app_window, &self.editor_state, &self.tree_model);
    }

    /// 解析路径、执行命令并按需刷新
    fn handle_command<F>(
        app_window: &AppWindow,
        editor_state: &Rc<RefCell<EditorState>>,
        tree_model: &Rc<VecModel<TypeRowData>>,
        path: &SharedString,
        success_message: &str,
        refresh: Refresh,
        command: F,
    ) where
        F: FnOnce(&mut EditorState, &[usize]) -> Result<bool, EditError>,
    {
        let result = parse_path_key(path.as_str()).and_then(|p| {
            let changed = command(&mut *editor_state.borrow_mut(), &p[..])?;
            Ok((p, changed))
        });

        match result {
            Ok((p, true)) => {
                tracing::info!("{}: 路径 [{}]", success_message, path);
                match refresh {
                    Refresh::SingleRow => {
                        Self::patch_tree_row(editor_state, tree_model, &p);
                        Self::refresh_source(app_window, editor_state);
                        Self::refresh_structure(app_window, editor_state);
                    }
                    Refresh::Rows => Self::refresh_all(app_window, editor_state, tree_model),
                }
                app_window.set_status_message(success_message.into());
            }
            Ok((_, false)) => {
                app_window.set_status_message(STATUS_UNCHANGED.into());
            }
            Err(e) => {
                tracing::warn!("编辑被拒绝: 路径 [{}]: {}", path, e);
                // 界面可能持有过期行，按当前状态重建
                Self::refresh_all(app_window, editor_state, tree_model);
                app_window.set_status_message(format!("{}{}", STATUS_ERROR_PREFIX, e).into());
            }
        }
    }

    fn refresh_all(
        app_window: &AppWindow,
        editor_state: &Rc<RefCell<EditorState>>,
        tree_model: &Rc<VecModel<TypeRowData>>,
    ) {
        Self::rebuild_tree_model(editor_state, tree_model);
        Self::refresh_source(app_window, editor_state);
        Self::refresh_structure(app_window, editor_state);
    }

    /// 重新构建左侧行模型
    fn rebuild_tree_model(
        editor_state: &Rc<RefCell<EditorState>>,
        tree_model: &Rc<VecModel<TypeRowData>>,
    ) {
        let rows: Vec<TypeRowData> = editor_state
            .borrow()
            .rows()
            .iter()
            .map(TypeRowData::from)
            .collect();
        tree_model.set_vec(rows);
    }

    /// 原地更新单行；行下标或 id 对不上时退回整体重建
    fn patch_tree_row(
        editor_state: &Rc<RefCell<EditorState>>,
        tree_model: &Rc<VecModel<TypeRowData>>,
        path: &[usize],
    ) {
        let Some((idx, row)) = editor_state.borrow().row_at(path) else {
            Self::rebuild_tree_model(editor_state, tree_model);
            return;
        };
        let data = TypeRowData::from(&row);
        match tree_model.row_data(idx) {
            Some(current) if current.id == data.id => tree_model.set_row_data(idx, data),
            _ => {
                tracing::warn!("行模型与类型树不同步，重建: 路径 [{}]", path_key(path));
                Self::rebuild_tree_model(editor_state, tree_model);
            }
        }
    }

    fn refresh_source(app_window: &AppWindow, editor_state: &Rc<RefCell<EditorState>>) {
        app_window.set_source_text(editor_state.borrow().source_text().into());
    }

    /// 仅在显示结构面板时生成 JSON
    fn refresh_structure(app_window: &AppWindow, editor_state: &Rc<RefCell<EditorState>>) {
        if !app_window.get_show_structure() {
            return;
        }
        match editor_state.borrow().structure_json() {
            Ok(json) => app_window.set_structure_json(json.into()),
            Err(e) => {
                tracing::error!("结构 JSON 生成失败: {}", e);
                app_window.set_status_message(format!("{}{}", STATUS_ERROR_PREFIX, e).into());
            }
        }
    }
}


fn main() -> anyhow::Result<()> {
    // 初始化日志输出
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    let app = AppWindow::new()?;
    let state = Rc::new(RefCell::new(EditorState::new()));

    // 创建VM桥接器并绑定UI回调
    let bridge = ViewModelBridge::new(&app, state);
    bridge.initialize_ui(&app);

    tracing::info!("应用启动成功，UI已初始化");
    app.run()?;
    Ok(())
}
