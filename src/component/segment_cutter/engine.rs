//! 外部切割引擎的介面
//!
//! 引擎擁有自己的檔案工作區，以檔名存取；執行時透過 `events` 回報
//! 記錄與進度。所有事件都在 `exec` 返回前、於呼叫端的執行緒上送出。

use crate::error::EngineIoError;
use std::io::Read;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// 引擎輸出的一行記錄
    Log(String),
    /// 完成比例，通常介於 0.0 到 1.0，但不保證遞增
    Progress(f64),
}

pub trait Engine: Send {
    /// 取得並初始化引擎資源，失敗時回傳原因
    fn load(&mut self) -> Result<(), String>;

    fn write_file(&mut self, name: &str, bytes: &[u8]) -> Result<(), EngineIoError>;

    /// 從串流寫入檔案；預設讀入記憶體後交給 `write_file`
    fn write_file_from(&mut self, name: &str, reader: &mut dyn Read) -> Result<(), EngineIoError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| EngineIoError::from_io(name, &e))?;
        self.write_file(name, &bytes)
    }

    fn read_file(&self, name: &str) -> Result<Vec<u8>, EngineIoError>;

    fn delete_file(&mut self, name: &str) -> Result<(), EngineIoError>;

    /// 執行一次指令，引擎回報的錯誤訊息原文回傳
    fn exec(&mut self, argv: &[String], events: &mut dyn FnMut(EngineEvent))
    -> Result<(), String>;
}
